use axum::{extract::State, Json};
use std::sync::Arc;

use hort_core::{errors::HortError, models::registry::CollectorDto};
use hort_db::repositories::collector;

use crate::{middleware::error_handling::AppError, ApiState};

/// `GET /api/collectors`
#[axum::debug_handler]
pub async fn list_collectors(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<CollectorDto>>, AppError> {
    let collectors = collector::list_collectors(&state.db_pool)
        .await
        .map_err(HortError::Database)?;

    let response = collectors
        .into_iter()
        .map(|c| CollectorDto {
            first_name: c.first_name,
            last_name: c.last_name,
            address: c.address,
            phone: c.phone,
        })
        .collect();

    Ok(Json(response))
}
