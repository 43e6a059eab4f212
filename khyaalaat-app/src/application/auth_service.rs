use super::AuthGate;
use crate::domain::{Credentials, UserIdentity, Viewer};
use crate::infrastructure::session::SessionUser;
use crate::infrastructure::store::PoetryStore;
use crate::infrastructure::supabase::{AuthSession, SignUpResult, SupabaseAuth};
use khyaalaat_errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Session(AuthSession),
    /// The provider sent a confirmation email; there is no session yet.
    ConfirmationSent,
    /// No live backend, so there is nobody to sign in against.
    Demo,
}

pub struct AuthService {
    auth: Option<SupabaseAuth>,
    store: PoetryStore,
    gate: AuthGate,
}

impl AuthService {
    pub fn new(auth: Option<SupabaseAuth>, store: PoetryStore, gate: AuthGate) -> Self {
        Self { auth, store, gate }
    }

    fn provider(&self) -> Option<&SupabaseAuth> {
        self.auth.as_ref().filter(|_| !self.store.is_demo())
    }

    pub fn viewer(&self, identity: UserIdentity) -> Viewer {
        self.gate.viewer(identity)
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResult, AppError> {
        let Some(auth) = self.provider() else {
            tracing::info!("Demo mode: would sign in {}", credentials.email);
            return Ok(AuthResult::Demo);
        };
        let credentials = credentials.validate()?;
        self.gate.check_login_email(&credentials.email)?;

        let session = auth
            .sign_in_with_password(&credentials.email, &credentials.password)
            .await?;
        self.remember(&session).await?;
        Ok(AuthResult::Session(session))
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<AuthResult, AppError> {
        let Some(auth) = self.provider() else {
            tracing::info!("Demo mode: would sign up {}", credentials.email);
            return Ok(AuthResult::Demo);
        };
        let credentials = credentials.validate()?;
        self.gate.check_login_email(&credentials.email)?;

        match auth.sign_up(&credentials.email, &credentials.password).await? {
            SignUpResult::Session(session) => {
                self.remember(&session).await?;
                Ok(AuthResult::Session(session))
            }
            SignUpResult::ConfirmationSent => Ok(AuthResult::ConfirmationSent),
        }
    }

    /// Anonymous sign-in for visitors who want to like and comment.
    pub async fn sign_in_as_guest(&self) -> Result<AuthResult, AppError> {
        let Some(auth) = self.provider() else {
            tracing::info!("Demo mode: would sign in a guest");
            return Ok(AuthResult::Demo);
        };
        let session = auth.sign_in_anonymously().await?;
        self.remember(&session).await?;
        Ok(AuthResult::Session(session))
    }

    /// Revokes the provider session. Failures are logged; the local session
    /// is dropped by the caller either way.
    pub async fn sign_out(&self, access_token: &str) {
        if let Some(auth) = self.provider() {
            if let Err(e) = auth.sign_out(access_token).await {
                tracing::warn!("Provider sign-out failed: {}", e);
            }
        }
    }

    /// Re-checks a stored session with the provider, refreshing an expired
    /// access token when a refresh token is at hand.
    ///
    /// Returns `None` when the provider rejects the session; keeps the stored
    /// user when the provider cannot be reached.
    pub async fn restore(&self, stored: SessionUser) -> Result<Option<SessionUser>, AppError> {
        let Some(auth) = self.provider() else {
            return Ok(None);
        };
        match auth.get_user(&stored.access_token).await {
            Ok(identity) => Ok(Some(SessionUser { identity, ..stored })),
            Err(AppError::Unauthorized(_)) | Err(AppError::NotFound(_)) => {
                self.refresh(auth, stored).await
            }
            Err(e) => {
                tracing::warn!("Could not verify session, keeping it: {}", e);
                Ok(Some(stored))
            }
        }
    }

    async fn refresh(
        &self,
        auth: &SupabaseAuth,
        stored: SessionUser,
    ) -> Result<Option<SessionUser>, AppError> {
        let Some(refresh_token) = stored.refresh_token.as_deref() else {
            tracing::info!(user = %stored.identity.id, "Stored session expired");
            return Ok(None);
        };
        match auth.refresh(refresh_token).await {
            Ok(session) => {
                self.remember(&session).await?;
                tracing::info!(user = %session.user.id, "Session refreshed");
                Ok(Some(SessionUser::from(session)))
            }
            Err(AppError::Unauthorized(_))
            | Err(AppError::NotFound(_))
            | Err(AppError::Validation(_)) => {
                tracing::info!(user = %stored.identity.id, "Refresh token rejected");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Could not refresh session, keeping it: {}", e);
                Ok(Some(stored))
            }
        }
    }

    async fn remember(&self, session: &AuthSession) -> Result<(), AppError> {
        if let Some(db) = self.store.live() {
            db.upsert_user(&session.user).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RESTRICTED_LOGIN_MESSAGE;
    use crate::infrastructure::db::{test_connection, DbStore};
    use crate::infrastructure::fixture::FixtureStore;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use uuid::Uuid;

    const USER_ID: &str = "6a1c1b4e-7a53-4f43-9d43-2b0d3a4f5e61";

    fn credentials(email: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: "secret-words".into(),
        }
    }

    async fn live_service() -> AuthService {
        // Nothing listens on port 9; a request reaching the network fails.
        let auth = SupabaseAuth::new("http://127.0.0.1:9", "anon").unwrap();
        service_with(auth).await
    }

    async fn service_with(auth: SupabaseAuth) -> AuthService {
        AuthService::new(
            Some(auth),
            PoetryStore::Database(DbStore::new(test_connection().await)),
            AuthGate::new(Some("poet@example.com".into())),
        )
    }

    #[tokio::test]
    async fn non_admin_email_is_refused_before_any_request() {
        let service = live_service().await;
        let error = service
            .sign_in(&credentials("reader@example.com"))
            .await
            .unwrap_err();
        assert_eq!(error.user_message(), RESTRICTED_LOGIN_MESSAGE);

        let error = service
            .sign_up(&credentials("reader@example.com"))
            .await
            .unwrap_err();
        assert_eq!(error.field_errors().and_then(|e| e.get("email")), Some(RESTRICTED_LOGIN_MESSAGE));
    }

    #[tokio::test]
    async fn malformed_credentials_fail_validation() {
        let service = live_service().await;
        let result = service
            .sign_in(&Credentials {
                email: "poet@example.com".into(),
                password: "123".into(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_backend_error() {
        let service = live_service().await;
        let result = service.sign_in(&credentials("poet@example.com")).await;
        assert!(matches!(result, Err(AppError::Backend(_))));
    }

    #[tokio::test]
    async fn demo_mode_has_nobody_to_sign_in() {
        let service = AuthService::new(
            None,
            PoetryStore::Fixture(FixtureStore::new()),
            AuthGate::new(Some("poet@example.com".into())),
        );
        assert_eq!(
            service.sign_in(&credentials("poet@example.com")).await,
            Ok(AuthResult::Demo)
        );
        assert_eq!(service.sign_in_as_guest().await, Ok(AuthResult::Demo));
    }

    /// A provider whose access tokens have all expired. With `accept_refresh`
    /// it trades `refresh-1` for a new token pair.
    async fn expired_provider(accept_refresh: bool) -> SupabaseAuth {
        let user = json!({ "id": USER_ID, "email": "poet@example.com" });
        let app = Router::new()
            .route(
                "/auth/v1/user",
                get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "JWT expired" }))) }),
            )
            .route(
                "/auth/v1/token",
                post(
                    move |Query(params): Query<HashMap<String, String>>, Json(body): Json<Value>| {
                        let user = user.clone();
                        async move {
                            let refresh_grant = params.get("grant_type").map(String::as_str)
                                == Some("refresh_token");
                            if accept_refresh && refresh_grant && body["refresh_token"] == "refresh-1" {
                                (
                                    StatusCode::OK,
                                    Json(json!({
                                        "access_token": "jwt-2",
                                        "refresh_token": "refresh-2",
                                        "user": user,
                                    })),
                                )
                            } else {
                                (
                                    StatusCode::BAD_REQUEST,
                                    Json(json!({
                                        "error": "invalid_grant",
                                        "error_description": "Invalid Refresh Token",
                                    })),
                                )
                            }
                        }
                    },
                ),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        SupabaseAuth::new(&format!("http://{addr}"), "anon").unwrap()
    }

    fn stored(refresh_token: Option<&str>) -> SessionUser {
        SessionUser {
            identity: UserIdentity {
                id: Uuid::parse_str(USER_ID).unwrap(),
                email: Some("poet@example.com".into()),
                name: Some("poet".into()),
                photo: None,
                is_anonymous: false,
            },
            access_token: "jwt-1".into(),
            refresh_token: refresh_token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn expired_access_token_is_refreshed() {
        let service = service_with(expired_provider(true).await).await;
        let restored = service
            .restore(stored(Some("refresh-1")))
            .await
            .unwrap()
            .expect("refresh should keep the visitor signed in");

        assert_eq!(restored.access_token, "jwt-2");
        assert_eq!(restored.refresh_token.as_deref(), Some("refresh-2"));
        assert_eq!(restored.identity.email.as_deref(), Some("poet@example.com"));
    }

    #[tokio::test]
    async fn rejected_refresh_token_ends_the_session() {
        let service = service_with(expired_provider(false).await).await;
        assert_eq!(service.restore(stored(Some("refresh-1"))).await, Ok(None));
    }

    #[tokio::test]
    async fn expired_session_without_refresh_token_ends() {
        let service = service_with(expired_provider(true).await).await;
        assert_eq!(service.restore(stored(None)).await, Ok(None));
    }

    #[tokio::test]
    async fn unreachable_provider_keeps_the_stored_session() {
        let service = live_service().await;
        let user = stored(Some("refresh-1"));
        assert_eq!(service.restore(user.clone()).await, Ok(Some(user)));
    }
}
