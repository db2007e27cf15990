//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error responses, so
//! every endpoint reports failures the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use hort_core::errors::HortError;

/// Application error wrapper that provides HTTP status code mapping.
///
/// `AppError` wraps domain-specific `HortError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub HortError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            HortError::NotFound(_) => StatusCode::NOT_FOUND,
            HortError::Validation(_) => StatusCode::BAD_REQUEST,
            HortError::Authentication(_) => StatusCode::UNAUTHORIZED,
            HortError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            HortError::AlreadyCheckedOut(_) => StatusCode::CONFLICT,
            HortError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HortError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Get the error message and format as JSON. Clients read the
        // `message` key, so the field name is part of the contract.
        let message = self.0.to_string();
        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}

/// Allows `?` on functions returning `Result<T, HortError>` inside
/// handlers returning `Result<T, AppError>`.
impl From<HortError> for AppError {
    fn from(err: HortError) -> Self {
        AppError(err)
    }
}

/// Wraps raw database/report errors in `HortError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(HortError::Database(err))
    }
}
