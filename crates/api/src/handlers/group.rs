use axum::{extract::State, Json};
use std::sync::Arc;

use hort_core::{errors::HortError, models::registry::GroupDto};
use hort_db::repositories::group;

use crate::{middleware::error_handling::AppError, ApiState};

/// `GET /api/groups`
#[axum::debug_handler]
pub async fn list_groups(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<GroupDto>>, AppError> {
    let groups = group::list_groups(&state.db_pool)
        .await
        .map_err(HortError::Database)?;

    let response = groups
        .into_iter()
        .map(|g| GroupDto {
            id: g.id,
            name: g.name,
        })
        .collect();

    Ok(Json(response))
}
