use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/checkout/search",
            get(handlers::checkout::search_for_checkout),
        )
        .route(
            "/api/checkout/confirm",
            post(handlers::checkout::confirm_checkout),
        )
}
