//! # Checkout Handlers
//!
//! The daily checkout screen: searching students together with their
//! resolved authorization state, and confirming a departure.
//!
//! Both handlers follow the same shape: fetch the student's permissions
//! and today's checkout event, run the pure resolver from `hort-core`,
//! then act on the result. The confirmation additionally relies on the
//! database uniqueness constraint to settle concurrent attempts.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::sync::Arc;

use hort_core::{
    errors::HortError,
    models::checkout::{
        CheckoutActor, CheckoutSearchResponse, CheckoutStudentInfo, ConfirmCheckoutRequest,
    },
    models::permission::Permission,
    resolver,
};
use hort_db::repositories::{checkout, permission, student};

use crate::{middleware::error_handling::AppError, ApiState};

/// Query parameters for the checkout search endpoint.
#[derive(Debug, Deserialize)]
pub struct CheckoutSearchQuery {
    /// Name fragment to search for; queries under 2 characters return an
    /// empty result set.
    pub q: Option<String>,
}

async fn load_permissions(
    state: &ApiState,
    student_id: i64,
    date: NaiveDate,
) -> Result<Vec<Permission>, AppError> {
    let rows = permission::get_active_permissions_for_date(&state.db_pool, student_id, date)
        .await
        .map_err(HortError::Database)?;

    let mut permissions = Vec::with_capacity(rows.len());
    for row in rows {
        permissions.push(row.into_domain().map_err(HortError::Database)?);
    }
    Ok(permissions)
}

async fn resolve_for_student(
    state: &ApiState,
    student_id: i64,
    as_of: NaiveDateTime,
) -> Result<hort_core::models::checkout::DailyAuthorization, AppError> {
    let date = as_of.date();
    let permissions = load_permissions(state, student_id, date).await?;
    let already_checked_out = checkout::get_checkout_event(&state.db_pool, student_id, date)
        .await
        .map_err(HortError::Database)?
        .is_some();

    Ok(resolver::resolve_daily_authorization(
        &permissions,
        already_checked_out,
        as_of,
    ))
}

/// `GET /api/checkout/search?q=` lists students matching the name
/// fragment, each with today's resolved authorization state.
#[axum::debug_handler]
pub async fn search_for_checkout(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CheckoutSearchQuery>,
) -> Result<Json<CheckoutSearchResponse>, AppError> {
    let q = query.q.unwrap_or_default().trim().to_string();
    if q.chars().count() < 2 {
        return Ok(Json(CheckoutSearchResponse { students: vec![] }));
    }

    let as_of = resolver::now_local();
    let rows = student::search_students(&state.db_pool, Some(q.as_str()), None)
        .await
        .map_err(HortError::Database)?;

    let mut students = Vec::with_capacity(rows.len());
    for row in rows {
        let authorization = resolve_for_student(&state, row.id, as_of).await?;
        students.push(CheckoutStudentInfo {
            student_id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            group_name: row.group_name,
            can_leave_alone_today: authorization.can_leave_alone_today,
            allowed_to_leave_from_time: authorization.allowed_to_leave_from_time,
            self_dismissal_id: authorization.self_dismissal_id,
            allowed_collectors: authorization.allowed_collectors,
            checked_out_today: authorization.already_checked_out_today,
        });
    }

    Ok(Json(CheckoutSearchResponse { students }))
}

/// `POST /api/checkout/confirm` records the departure for today.
///
/// Validates the actor against the resolved authorization, then inserts
/// the event with `ON CONFLICT DO NOTHING`; a conflicting insert (a
/// concurrent confirmation won the race) is reported as
/// `AlreadyCheckedOut`, never overwritten.
#[axum::debug_handler]
pub async fn confirm_checkout(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ConfirmCheckoutRequest>,
) -> Result<StatusCode, AppError> {
    let actor = if payload.self_dismissal {
        if payload.collector_id.is_some() || payload.pickup_right_id.is_some() {
            return Err(AppError(HortError::invalid_fields(&[
                "selfDismissal",
                "collectorId",
                "pickupRightId",
            ])));
        }
        CheckoutActor::SelfDismissal
    } else {
        match (payload.collector_id, payload.pickup_right_id) {
            (Some(collector_id), Some(pickup_right_id)) => CheckoutActor::Collector {
                collector_id,
                pickup_right_id,
            },
            _ => {
                return Err(AppError(HortError::invalid_fields(&[
                    "collectorId",
                    "pickupRightId",
                ])));
            }
        }
    };

    let as_of = resolver::now_local();
    let authorization = resolve_for_student(&state, payload.student_id, as_of).await?;

    resolver::authorize_checkout(&authorization, &actor, as_of)?;

    let (method, collector_id, permission_id) = match &actor {
        CheckoutActor::SelfDismissal => ("SELF", None, authorization.self_dismissal_id),
        CheckoutActor::Collector {
            collector_id,
            pickup_right_id,
        } => ("COLLECTOR", Some(*collector_id), Some(*pickup_right_id)),
    };

    let inserted = checkout::insert_checkout_event(
        &state.db_pool,
        payload.student_id,
        as_of.date(),
        method,
        collector_id,
        permission_id,
        payload.comment.as_deref(),
    )
    .await
    .map_err(HortError::Database)?;

    if inserted.is_none() {
        // Lost the race to a concurrent confirmation.
        return Err(AppError(HortError::AlreadyCheckedOut(
            "student is already checked out today".to_string(),
        )));
    }

    Ok(StatusCode::CREATED)
}
