use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use hort_core::{
    errors::HortError,
    models::registry::{CollectorDto, StudentDto, StudentOnboardingRequest},
};
use hort_db::repositories::{group, student};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentsQuery {
    pub name: Option<String>,
    pub group_id: Option<i64>,
}

/// `GET /api/students?name=&groupId=`
#[axum::debug_handler]
pub async fn get_students(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<StudentsQuery>,
) -> Result<Json<Vec<StudentDto>>, AppError> {
    let name = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let rows = student::search_students(&state.db_pool, name, query.group_id)
        .await
        .map_err(HortError::Database)?;

    let mut students = Vec::with_capacity(rows.len());
    for row in rows {
        let collectors = student::get_active_collectors(&state.db_pool, row.id)
            .await
            .map_err(HortError::Database)?;

        students.push(StudentDto {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            address: row.address,
            group: row.group_name,
            collectors: collectors
                .into_iter()
                .map(|c| CollectorDto {
                    first_name: c.first_name,
                    last_name: c.last_name,
                    address: c.address,
                    phone: c.phone,
                })
                .collect(),
        });
    }

    Ok(Json(students))
}

fn validate_onboarding(request: &StudentOnboardingRequest) -> Result<(), HortError> {
    let mut violations: Vec<&str> = Vec::new();

    if request.student.first_name.trim().is_empty() {
        violations.push("student.firstName");
    }
    if request.student.last_name.trim().is_empty() {
        violations.push("student.lastName");
    }
    for collector in &request.collectors {
        if collector.first_name.trim().is_empty() {
            violations.push("collectors.firstName");
        }
        if collector.last_name.trim().is_empty() {
            violations.push("collectors.lastName");
        }
        if let (Some(from), Some(until)) = (collector.valid_from, collector.valid_until) {
            if from > until {
                violations.push("collectors.validFrom");
                violations.push("collectors.validUntil");
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        // Several collectors can trip the same rule; report each field once.
        let mut unique: Vec<&str> = Vec::with_capacity(violations.len());
        for field in violations {
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        Err(HortError::invalid_fields(&unique))
    }
}

/// `POST /api/students` onboards a student with their group and initial
/// pickup rights in one transaction.
#[axum::debug_handler]
pub async fn onboard_student(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<StudentOnboardingRequest>,
) -> Result<(StatusCode, Json<StudentDto>), AppError> {
    validate_onboarding(&payload)?;

    group::get_group_by_id(&state.db_pool, payload.group_id)
        .await
        .map_err(HortError::Database)?
        .ok_or_else(|| {
            HortError::NotFound(format!("Group with ID {} not found", payload.group_id))
        })?;

    let created = student::create_student_with_collectors(&state.db_pool, &payload)
        .await
        .map_err(HortError::Database)?;

    let collectors = student::get_active_collectors(&state.db_pool, created.id)
        .await
        .map_err(HortError::Database)?;

    let response = StudentDto {
        id: created.id,
        first_name: created.first_name,
        last_name: created.last_name,
        address: created.address,
        group: created.group_name,
        collectors: collectors
            .into_iter()
            .map(|c| CollectorDto {
                first_name: c.first_name,
                last_name: c.last_name,
                address: c.address,
                phone: c.phone,
            })
            .collect(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
