use crate::domain::{UserIdentity, Viewer};
use khyaalaat_errors::{AppError, FieldErrors};

pub const RESTRICTED_LOGIN_MESSAGE: &str =
    "Access is restricted. Please use the authorized email address.";

/// Decides who may do what. The site has exactly one admin, identified by
/// email address.
#[derive(Debug, Clone)]
pub struct AuthGate {
    admin_email: Option<String>,
}

impl AuthGate {
    pub fn new(admin_email: Option<String>) -> Self {
        Self {
            admin_email: admin_email
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
        }
    }

    pub fn has_admin(&self) -> bool {
        self.admin_email.is_some()
    }

    fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email
            .as_deref()
            .is_some_and(|admin| admin == email.trim().to_lowercase())
    }

    pub fn is_admin(&self, identity: &UserIdentity) -> bool {
        !identity.is_anonymous
            && identity
                .email
                .as_deref()
                .is_some_and(|email| self.is_admin_email(email))
    }

    pub fn require_user<'a>(
        &self,
        identity: Option<&'a UserIdentity>,
    ) -> Result<&'a UserIdentity, AppError> {
        identity.ok_or_else(|| AppError::Unauthorized("no signed-in user".to_string()))
    }

    pub fn require_admin<'a>(
        &self,
        identity: Option<&'a UserIdentity>,
    ) -> Result<&'a UserIdentity, AppError> {
        let identity = self.require_user(identity)?;
        if self.is_admin(identity) {
            Ok(identity)
        } else {
            tracing::warn!(user = %identity.id, "Admin action refused");
            Err(AppError::Forbidden("admin only".to_string()))
        }
    }

    /// Email sign-in and sign-up are reserved for the admin address.
    pub fn check_login_email(&self, email: &str) -> Result<(), AppError> {
        if self.is_admin_email(email) {
            Ok(())
        } else {
            Err(FieldErrors::single("email", RESTRICTED_LOGIN_MESSAGE).into())
        }
    }

    pub fn viewer(&self, identity: UserIdentity) -> Viewer {
        Viewer {
            is_admin: self.is_admin(&identity),
            identity,
        }
    }
}
