use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use hort_core::{
    errors::HortError,
    models::permission::{NewPermissionRequest, PermissionViewDto},
};
use hort_db::repositories::permission;

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct ListPermissionsQuery {
    pub status: Option<String>,
}

/// `GET /api/permissions?status=ACTIVE|ALL`
#[axum::debug_handler]
pub async fn list_permissions(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListPermissionsQuery>,
) -> Result<Json<Vec<PermissionViewDto>>, AppError> {
    let active_only = match query.status.as_deref() {
        None | Some("ACTIVE") => true,
        Some("ALL") => false,
        Some(other) => {
            return Err(AppError(HortError::Validation(format!(
                "unknown status filter: {other}"
            ))));
        }
    };

    let views = permission::list_permission_views(&state.db_pool, active_only)
        .await
        .map_err(HortError::Database)?;

    let response = views
        .into_iter()
        .map(|v| PermissionViewDto {
            permission_id: v.permission_id,
            permission_kind: v.permission_kind,
            student_id: v.student_id,
            student_first_name: v.student_first_name,
            student_last_name: v.student_last_name,
            student_group_name: v.student_group_name,
            collector_id: v.collector_id,
            collector_first_name: v.collector_first_name,
            collector_last_name: v.collector_last_name,
            collector_phone: v.collector_phone,
            valid_from: v.valid_from,
            valid_until: v.valid_until,
            allowed_from_time: v.allowed_from_time,
            status: v.status,
        })
        .collect();

    Ok(Json(response))
}

/// `POST /api/permissions` validates the request and creates the record.
#[axum::debug_handler]
pub async fn create_permission(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<NewPermissionRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    permission::create_permission(&state.db_pool, &payload)
        .await
        .map_err(HortError::Database)?;

    Ok(StatusCode::CREATED)
}

/// `POST /api/permissions/:id/deactivate` flips the status to INACTIVE.
/// Deactivating an already inactive permission is a no-op that succeeds.
#[axum::debug_handler]
pub async fn deactivate_permission(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let found = permission::deactivate_permission(&state.db_pool, id)
        .await
        .map_err(HortError::Database)?;

    if !found {
        return Err(AppError(HortError::NotFound(format!(
            "Permission with ID {id} not found"
        ))));
    }

    Ok(StatusCode::NO_CONTENT)
}
