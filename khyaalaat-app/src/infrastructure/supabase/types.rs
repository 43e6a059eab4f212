use crate::domain::UserIdentity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A provider session projected into what the application keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: UserIdentity,
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: GoTrueUser,
}

impl TokenResponse {
    pub fn into_session(self) -> AuthSession {
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user: self.user.into_identity(),
        }
    }
}

/// Sign-up answers with a session when email confirmation is off and with
/// the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponse {
    Session(TokenResponse),
    User(GoTrueUser),
}

#[derive(Debug, Deserialize)]
pub(super) struct GoTrueUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
}

impl GoTrueUser {
    pub fn into_identity(self) -> UserIdentity {
        let email = self.email.filter(|e| !e.is_empty());
        let metadata = self.user_metadata;
        let name = metadata
            .full_name
            .or(metadata.name)
            .or_else(|| {
                email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
            .or_else(|| self.is_anonymous.then(|| "Guest".to_string()));

        UserIdentity {
            id: self.id,
            email,
            name,
            photo: metadata.avatar_url.or(metadata.picture),
            is_anonymous: self.is_anonymous,
        }
    }
}

/// GoTrue and Storage use several error shapes across versions.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error_description: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_projects_the_user() {
        let body = r#"{
            "access_token": "jwt",
            "refresh_token": "r",
            "token_type": "bearer",
            "user": {
                "id": "6a1c1b4e-7a53-4f43-9d43-2b0d3a4f5e61",
                "email": "poet@example.com",
                "user_metadata": { "avatar_url": "https://example.com/a.png" }
            }
        }"#;
        let session = serde_json::from_str::<TokenResponse>(body).unwrap().into_session();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.user.name.as_deref(), Some("poet"));
        assert_eq!(session.user.photo.as_deref(), Some("https://example.com/a.png"));
        assert!(!session.user.is_anonymous);
    }

    #[test]
    fn anonymous_users_are_guests() {
        let body = r#"{ "id": "6a1c1b4e-7a53-4f43-9d43-2b0d3a4f5e61", "email": "", "is_anonymous": true }"#;
        let identity = serde_json::from_str::<GoTrueUser>(body).unwrap().into_identity();
        assert_eq!(identity.email, None);
        assert_eq!(identity.name.as_deref(), Some("Guest"));
    }

    #[test]
    fn sign_up_without_session_is_a_bare_user() {
        let body = r#"{ "id": "6a1c1b4e-7a53-4f43-9d43-2b0d3a4f5e61", "email": "poet@example.com" }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(body).unwrap(),
            SignUpResponse::User(_)
        ));
    }

    #[test]
    fn error_message_prefers_msg() {
        let body = r#"{ "code": 400, "error_code": "invalid_credentials", "msg": "Invalid login credentials" }"#;
        let message = serde_json::from_str::<ErrorBody>(body).unwrap().into_message();
        assert_eq!(message.as_deref(), Some("Invalid login credentials"));
    }
}
