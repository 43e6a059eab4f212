mod auth_gate;
mod auth_service;
mod poetry_service;
mod request_service;
mod suggest_topics;

pub use auth_gate::{AuthGate, RESTRICTED_LOGIN_MESSAGE};
pub use auth_service::{AuthResult, AuthService};
pub use poetry_service::PoetryService;
pub use request_service::RequestService;
pub use suggest_topics::SuggestTopics;

use crate::domain::WriteOutcome;
use khyaalaat_errors::AppError;

/// Demo mode answer to a write: nothing happens and the caller is told so.
fn skipped<T>(action: &str) -> Result<WriteOutcome<T>, AppError> {
    tracing::info!("Demo mode: would {}", action);
    Ok(WriteOutcome::Skipped)
}
