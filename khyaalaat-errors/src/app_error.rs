use crate::FieldErrors;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Sign-in required: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Storage request failed: {0}")]
    Storage(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse grouping that decides how the UI surfaces a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Shown inline next to the offending form field.
    Validation,
    /// Blocking toast; unauthenticated users are sent to the login page.
    Auth,
    /// Dismissible toast, local optimistic state is rolled back.
    Transient,
    /// The entity vanished underneath us; the view should refetch.
    NotFound,
    Internal,
}

const PREFIXES: &[&str] = &[
    "Validation failed: ",
    "Sign-in required: ",
    "Forbidden: ",
    "Not found: ",
    "Backend request failed: ",
    "Storage request failed: ",
    "Too many requests: ",
    "Schema mismatch: ",
    "Unavailable: ",
    "Internal error: ",
];

impl FromStr for AppError {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let matched = PREFIXES
            .iter()
            .enumerate()
            .find_map(|(i, prefix)| s.strip_prefix(prefix).map(|rest| (i, rest.to_string())));

        let error = match matched {
            Some((0, rest)) => {
                AppError::Validation(rest.parse().unwrap_or_else(|never| match never {}))
            }
            Some((1, rest)) => AppError::Unauthorized(rest),
            Some((2, rest)) => AppError::Forbidden(rest),
            Some((3, rest)) => AppError::NotFound(rest),
            Some((4, rest)) => AppError::Backend(rest),
            Some((5, rest)) => AppError::Storage(rest),
            Some((6, rest)) => AppError::RateLimited(rest),
            Some((7, rest)) => AppError::SchemaMismatch(rest),
            Some((8, rest)) => AppError::Unavailable(rest),
            Some((_, rest)) => AppError::Internal(rest),
            None => AppError::Internal(s.to_string()),
        };
        Ok(error)
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized(_) | Self::Forbidden(_) => ErrorKind::Auth,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Backend(_) | Self::Storage(_) | Self::RateLimited(_) | Self::Unavailable(_) => {
                ErrorKind::Transient
            }
            Self::SchemaMismatch(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(errors) => errors
                .first_message()
                .unwrap_or("Please check the form fields."),
            Self::Unauthorized(_) => "You need to sign in first.",
            Self::Forbidden(_) => "Only the site owner can do that.",
            Self::NotFound(_) => "It looks like this was removed in the meantime.",
            Self::Backend(_) => "The server could not be reached. Please try again.",
            Self::Storage(_) => "The image could not be stored. Please try again.",
            Self::RateLimited(msg) => msg,
            Self::SchemaMismatch(_) => "The database is not set up correctly.",
            Self::Unavailable(msg) => msg,
            Self::Internal(_) => "Something went wrong on our side. Please try again later.",
        }
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

#[cfg(feature = "ssr")]
mod ssr_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = match &self {
                AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Backend(_) | AppError::Storage(_) => StatusCode::BAD_GATEWAY,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AppError::SchemaMismatch(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            let message = self.to_string();
            (status, Json(ErrorResponse { message })).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_parses_back_to_the_same_variant() {
        let errors = [
            AppError::Validation(FieldErrors::single("topic", "Topic must be at least 2 characters.")),
            AppError::Unauthorized("no session".into()),
            AppError::Forbidden("admin only".into()),
            AppError::NotFound("poem".into()),
            AppError::Backend("connection reset".into()),
            AppError::RateLimited("wait 30 seconds".into()),
            AppError::Internal("boom".into()),
        ];
        for error in errors {
            let parsed: AppError = error.to_string().parse().unwrap();
            assert_eq!(parsed, error);
        }
    }

    #[test]
    fn unknown_text_becomes_internal() {
        let parsed: AppError = "error running server function: ???".parse().unwrap();
        assert_eq!(parsed.kind(), ErrorKind::Internal);
    }

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(AppError::Forbidden(String::new()).kind(), ErrorKind::Auth);
        assert_eq!(AppError::Backend(String::new()).kind(), ErrorKind::Transient);
        assert_eq!(AppError::NotFound(String::new()).kind(), ErrorKind::NotFound);
        assert_eq!(
            AppError::Validation(FieldErrors::new()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn validation_message_is_the_first_field_message() {
        let error = AppError::from(FieldErrors::single(
            "topic",
            "Topic must be at least 2 characters.",
        ));
        assert_eq!(error.user_message(), "Topic must be at least 2 characters.");
    }
}
