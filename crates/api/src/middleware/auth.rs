//! # Authentication Middleware
//!
//! Bearer-token check for the business routes. The expected token comes
//! from configuration and is read out of the shared state per request;
//! token issuance and refresh belong to the identity provider in front of
//! the clients, not to this service.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use hort_core::errors::HortError;

use crate::{middleware::error_handling::AppError, ApiState};

/// Rejects requests whose `Authorization` header does not carry the
/// configured bearer token. A missing configuration disables the check.
pub async fn require_bearer(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = &state.bearer_token else {
        return Ok(next.run(request).await);
    };

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match header.and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => Err(AppError(HortError::Authentication(
            "invalid bearer token".to_string(),
        ))),
        None => Err(AppError(HortError::Authentication(
            "missing bearer token".to_string(),
        ))),
    }
}
