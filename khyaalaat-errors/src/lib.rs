mod app_error;
mod field_errors;

pub use app_error::{AppError, ErrorKind};
pub use field_errors::{FieldError, FieldErrors};
