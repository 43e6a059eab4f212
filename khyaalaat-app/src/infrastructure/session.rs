//! The signed-in user as kept in the server-side session.

use crate::domain::UserIdentity;
use crate::infrastructure::supabase::AuthSession;
use khyaalaat_errors::AppError;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const AUTH_KEY: &str = "auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub identity: UserIdentity,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl From<AuthSession> for SessionUser {
    fn from(session: AuthSession) -> Self {
        Self {
            identity: session.user,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
        }
    }
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    tracing::error!("Session store error: {}", e);
    AppError::Internal(format!("session: {e}"))
}

pub async fn load_user(session: &Session) -> Result<Option<SessionUser>, AppError> {
    session.get(AUTH_KEY).await.map_err(session_error)
}

/// Stores the user under a fresh session id.
pub async fn store_user(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session.cycle_id().await.map_err(session_error)?;
    session.insert(AUTH_KEY, user).await.map_err(session_error)
}

/// Overwrites the stored user in place, e.g. after a token refresh.
pub async fn update_user(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session.insert(AUTH_KEY, user).await.map_err(session_error)
}

pub async fn clear_user(session: &Session) -> Result<(), AppError> {
    session.flush().await.map_err(session_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;
    use uuid::Uuid;

    fn user() -> SessionUser {
        SessionUser {
            identity: UserIdentity {
                id: Uuid::new_v4(),
                email: Some("poet@example.com".into()),
                name: Some("poet".into()),
                photo: None,
                is_anonymous: false,
            },
            access_token: "jwt".into(),
            refresh_token: Some("refresh".into()),
        }
    }

    #[tokio::test]
    async fn stored_user_can_be_loaded_and_cleared() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert_eq!(load_user(&session).await, Ok(None));

        let user = user();
        store_user(&session, &user).await.unwrap();
        assert_eq!(load_user(&session).await, Ok(Some(user.clone())));

        let refreshed = SessionUser {
            access_token: "jwt-2".into(),
            ..user
        };
        update_user(&session, &refreshed).await.unwrap();
        assert_eq!(load_user(&session).await, Ok(Some(refreshed)));

        clear_user(&session).await.unwrap();
        assert_eq!(load_user(&session).await, Ok(None));
    }
}
