use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a user that is shown next to likes and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: Option<String>,
    pub photo: Option<String>,
}

impl UserInfo {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Anonymous")
    }
}

/// Identity projected from an auth provider session. The provider owns the
/// user; this is the denormalized copy the application works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub is_anonymous: bool,
}

impl UserIdentity {
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            photo: self.photo.clone(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(if self.is_anonymous { "Guest" } else { "Anonymous" })
    }
}

/// What the browser learns about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub identity: UserIdentity,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthOutcome {
    SignedIn(Viewer),
    /// Sign-up succeeded but the provider wants the address confirmed first.
    ConfirmationSent,
    /// No live backend is configured, so there is nobody to sign in against.
    DemoMode,
}
