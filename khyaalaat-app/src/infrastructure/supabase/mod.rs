mod auth;
mod storage;
mod types;

pub use auth::{SignUpResult, SupabaseAuth};
pub use storage::{object_path_from_public_url, SupabaseStorage, BUCKET};
pub use types::AuthSession;

use khyaalaat_errors::{AppError, FieldErrors};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| AppError::Internal(format!("HTTP client: {e}")))
}

/// Turns a non-success Supabase response into an `AppError`.
async fn error_from_response(service: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<types::ErrorBody>(&body)
        .ok()
        .and_then(types::ErrorBody::into_message)
        .unwrap_or_else(|| status.to_string());

    tracing::warn!("Supabase {} error: {} - {}", service, status, body);

    match status.as_u16() {
        400 | 422 => AppError::Validation(FieldErrors::single("form", &message)),
        401 | 403 => AppError::Unauthorized(message),
        404 => AppError::NotFound(message),
        429 => AppError::RateLimited(message),
        _ if service == "storage" => AppError::Storage(format!("{status}: {message}")),
        _ => AppError::Backend(format!("{status}: {message}")),
    }
}
