use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/permissions", get(handlers::permission::list_permissions))
        .route("/api/permissions", post(handlers::permission::create_permission))
        .route(
            "/api/permissions/:id/deactivate",
            post(handlers::permission::deactivate_permission),
        )
}
