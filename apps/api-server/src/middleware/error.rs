//! Error handling - RFC 7807 compliant responses.

use std::fmt;
use std::time::Duration;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use gallery_core::DomainError;
use gallery_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Timeout(Duration),
    Storage(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Timeout(after) => write!(f, "Timed out after {}ms", after.as_millis()),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::Validation(detail) => ErrorResponse::validation(detail),
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Timeout(after) => {
                tracing::warn!(timeout_ms = after.as_millis() as u64, "Operation timed out");
                ErrorResponse::timeout(self.to_string())
            }
            AppError::Storage(detail) => {
                // Details stay in the log
                tracing::error!("Storage error: {}", detail);
                ErrorResponse::storage()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Timeout(after) => AppError::Timeout(after),
            DomainError::Storage(msg) => AppError::Storage(msg),
        }
    }
}

/// Malformed JSON bodies become validation problems.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("invalid JSON body: {err}")).into()
}

/// Malformed query strings become validation problems.
pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("invalid query string: {err}")).into()
}

/// Malformed path segments become validation problems.
pub fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("invalid path: {err}")).into()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
