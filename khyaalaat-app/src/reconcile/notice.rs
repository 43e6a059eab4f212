use khyaalaat_errors::{AppError, ErrorKind};
use serde::{Deserialize, Serialize};

/// User actions that write to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Like,
    AddComment,
    DeleteComment,
    DeletePoem,
    ToggleCompleted,
    DeleteRequest,
    SubmitRequest,
    UploadPoem,
}

impl MutationKind {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Like => "Failed to update like status.",
            Self::AddComment => "Failed to add comment.",
            Self::DeleteComment => "Failed to delete comment.",
            Self::DeletePoem => "Failed to delete the poem.",
            Self::ToggleCompleted => "Failed to update request status.",
            Self::DeleteRequest => "Failed to delete the request.",
            Self::SubmitRequest => "Failed to send your request. Please try again.",
            Self::UploadPoem => "Could not save poetry. Please try again.",
        }
    }
}

/// A toast message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub destructive: bool,
    /// Send the user to the login page after showing the notice.
    pub redirect_to_login: bool,
    /// The entity is gone; the view should refetch.
    pub refetch: bool,
}

impl Notice {
    pub fn success(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            destructive: false,
            redirect_to_login: false,
            refetch: false,
        }
    }

    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self {
            destructive: true,
            ..Self::success(title, description)
        }
    }

    pub fn sign_in_required() -> Self {
        Self {
            redirect_to_login: true,
            ..Self::error("Sign in required", "Sign in or continue as a guest to do that.")
        }
    }

    pub fn for_failure(kind: MutationKind, error: &AppError) -> Self {
        match error.kind() {
            ErrorKind::Auth => Self {
                redirect_to_login: matches!(error, AppError::Unauthorized(_)),
                ..Self::error("Unauthorized", error.user_message())
            },
            ErrorKind::Validation => Self::error("Invalid input", error.user_message()),
            ErrorKind::NotFound => Self {
                refetch: true,
                ..Self::error("Not found", error.user_message())
            },
            ErrorKind::Transient | ErrorKind::Internal => match error {
                AppError::RateLimited(_) | AppError::Unavailable(_) => {
                    Self::error("Error", error.user_message())
                }
                _ => Self::error("Error", kind.failure_message()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_like_failure_uses_the_like_message() {
        let notice = Notice::for_failure(
            MutationKind::Like,
            &AppError::Backend("connection refused".into()),
        );
        assert_eq!(notice.description, "Failed to update like status.");
        assert!(notice.destructive);
        assert!(!notice.redirect_to_login);
    }

    #[test]
    fn missing_session_redirects_but_forbidden_does_not() {
        let unauthenticated =
            Notice::for_failure(MutationKind::AddComment, &AppError::Unauthorized("".into()));
        assert!(unauthenticated.redirect_to_login);

        let forbidden =
            Notice::for_failure(MutationKind::DeletePoem, &AppError::Forbidden("".into()));
        assert!(!forbidden.redirect_to_login);
        assert_eq!(forbidden.title, "Unauthorized");
    }

    #[test]
    fn not_found_asks_for_a_refetch() {
        let notice =
            Notice::for_failure(MutationKind::DeleteComment, &AppError::NotFound("comment".into()));
        assert!(notice.refetch);
    }
}
