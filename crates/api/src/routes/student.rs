use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/students", get(handlers::student::get_students))
        .route("/api/students", post(handlers::student::onboard_student))
}
