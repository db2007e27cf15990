//! Confirmation flow tests against mock repositories: the wrapper mirrors
//! the confirm handler's resolve -> authorize -> conflict-insert sequence
//! without a database.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use hort_core::errors::HortError;
use hort_core::models::checkout::{CheckoutActor, ConfirmCheckoutRequest};
use hort_core::resolver::{authorize_checkout, resolve_daily_authorization};
use hort_db::mock::repositories::{MockCheckoutRepo, MockPermissionRepo};
use hort_db::models::{DbCheckoutEvent, DbPermission};

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn self_dismissal_row(id: i64, student_id: i64, threshold: Option<NaiveTime>) -> DbPermission {
    DbPermission {
        id,
        student_id,
        kind: "SELF_DISMISSAL".to_string(),
        collector_id: None,
        main_collector: false,
        valid_from: Some(dt(2025, 1, 1, 0, 0)),
        valid_until: Some(dt(2025, 1, 31, 0, 0)),
        allowed_from_time: threshold,
        allowed_monday: None,
        allowed_tuesday: None,
        allowed_wednesday: None,
        allowed_thursday: None,
        allowed_friday: None,
        status: "ACTIVE".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 12, 1, 8, 0, 0).unwrap(),
        collector_first_name: None,
        collector_last_name: None,
        collector_address: None,
        collector_phone: None,
    }
}

fn checkout_event(student_id: i64, date: NaiveDate) -> DbCheckoutEvent {
    DbCheckoutEvent {
        id: 1,
        student_id,
        checkout_date: date,
        method: "SELF".to_string(),
        collector_id: None,
        permission_id: Some(10),
        comment: None,
        confirmed_at: Utc.with_ymd_and_hms(2025, 1, 15, 14, 5, 0).unwrap(),
    }
}

/// Mirrors `handlers::checkout::confirm_checkout` against mock repos.
async fn confirm_with_mocks(
    permission_repo: &MockPermissionRepo,
    checkout_repo: &MockCheckoutRepo,
    payload: ConfirmCheckoutRequest,
    as_of: NaiveDateTime,
) -> Result<(), HortError> {
    let actor = if payload.self_dismissal {
        CheckoutActor::SelfDismissal
    } else {
        match (payload.collector_id, payload.pickup_right_id) {
            (Some(collector_id), Some(pickup_right_id)) => CheckoutActor::Collector {
                collector_id,
                pickup_right_id,
            },
            _ => {
                return Err(HortError::invalid_fields(&["collectorId", "pickupRightId"]));
            }
        }
    };

    let date = as_of.date();
    let rows = permission_repo
        .get_active_permissions_for_date(payload.student_id, date)
        .await
        .map_err(HortError::Database)?;
    let mut permissions = Vec::with_capacity(rows.len());
    for row in rows {
        permissions.push(row.into_domain().map_err(HortError::Database)?);
    }

    let already_checked_out = checkout_repo
        .get_checkout_event(payload.student_id, date)
        .await
        .map_err(HortError::Database)?
        .is_some();

    let authorization = resolve_daily_authorization(&permissions, already_checked_out, as_of);
    authorize_checkout(&authorization, &actor, as_of)?;

    let (method, collector_id, permission_id) = match &actor {
        CheckoutActor::SelfDismissal => ("SELF", None, authorization.self_dismissal_id),
        CheckoutActor::Collector {
            collector_id,
            pickup_right_id,
        } => ("COLLECTOR", Some(*collector_id), Some(*pickup_right_id)),
    };

    let inserted = checkout_repo
        .insert_checkout_event(payload.student_id, date, method, collector_id, permission_id, None)
        .await
        .map_err(HortError::Database)?;

    if inserted.is_none() {
        return Err(HortError::AlreadyCheckedOut(
            "student is already checked out today".to_string(),
        ));
    }

    Ok(())
}

fn self_confirm_payload(student_id: i64) -> ConfirmCheckoutRequest {
    ConfirmCheckoutRequest {
        student_id,
        collector_id: None,
        pickup_right_id: None,
        self_dismissal: true,
        comment: None,
    }
}

#[tokio::test]
async fn test_self_confirm_succeeds_after_threshold() {
    let mut permission_repo = MockPermissionRepo::new();
    let mut checkout_repo = MockCheckoutRepo::new();

    permission_repo
        .expect_get_active_permissions_for_date()
        .returning(|student_id, _| Ok(vec![self_dismissal_row(10, student_id, Some(t(15, 0)))]));
    checkout_repo
        .expect_get_checkout_event()
        .returning(|_, _| Ok(None));
    checkout_repo
        .expect_insert_checkout_event()
        .withf(|_, _, method, collector_id, permission_id, _| {
            method == "SELF" && collector_id.is_none() && *permission_id == Some(10)
        })
        .returning(|student_id, date, _, _, _, _| Ok(Some(checkout_event(student_id, date))));

    let result = confirm_with_mocks(
        &permission_repo,
        &checkout_repo,
        self_confirm_payload(5),
        dt(2025, 1, 15, 15, 1),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_self_confirm_before_threshold_is_not_authorized() {
    let mut permission_repo = MockPermissionRepo::new();
    let mut checkout_repo = MockCheckoutRepo::new();

    permission_repo
        .expect_get_active_permissions_for_date()
        .returning(|student_id, _| Ok(vec![self_dismissal_row(10, student_id, Some(t(15, 0)))]));
    checkout_repo
        .expect_get_checkout_event()
        .returning(|_, _| Ok(None));
    // No insert expectation: reaching the insert would fail the test.

    let result = confirm_with_mocks(
        &permission_repo,
        &checkout_repo,
        self_confirm_payload(5),
        dt(2025, 1, 15, 14, 30),
    )
    .await;

    assert!(matches!(result, Err(HortError::NotAuthorized(_))));
}

#[tokio::test]
async fn test_second_confirm_same_day_conflicts() {
    let mut permission_repo = MockPermissionRepo::new();
    let mut checkout_repo = MockCheckoutRepo::new();

    permission_repo
        .expect_get_active_permissions_for_date()
        .returning(|student_id, _| Ok(vec![self_dismissal_row(10, student_id, None)]));
    checkout_repo
        .expect_get_checkout_event()
        .returning(|student_id, date| Ok(Some(checkout_event(student_id, date))));

    let result = confirm_with_mocks(
        &permission_repo,
        &checkout_repo,
        self_confirm_payload(5),
        dt(2025, 1, 15, 16, 0),
    )
    .await;

    assert!(matches!(result, Err(HortError::AlreadyCheckedOut(_))));
}

#[tokio::test]
async fn test_concurrent_confirm_losing_the_insert_race_conflicts() {
    let mut permission_repo = MockPermissionRepo::new();
    let mut checkout_repo = MockCheckoutRepo::new();

    permission_repo
        .expect_get_active_permissions_for_date()
        .returning(|student_id, _| Ok(vec![self_dismissal_row(10, student_id, None)]));
    // The resolver read saw no event, but the insert hits the uniqueness
    // constraint because a concurrent confirmation committed in between.
    checkout_repo
        .expect_get_checkout_event()
        .returning(|_, _| Ok(None));
    checkout_repo
        .expect_insert_checkout_event()
        .returning(|_, _, _, _, _, _| Ok(None));

    let result = confirm_with_mocks(
        &permission_repo,
        &checkout_repo,
        self_confirm_payload(5),
        dt(2025, 1, 15, 16, 0),
    )
    .await;

    assert!(matches!(result, Err(HortError::AlreadyCheckedOut(_))));
}

#[tokio::test]
async fn test_collector_confirm_requires_matching_right() {
    let mut permission_repo = MockPermissionRepo::new();
    let mut checkout_repo = MockCheckoutRepo::new();

    // Only a self-dismissal permission exists; no collector may confirm.
    permission_repo
        .expect_get_active_permissions_for_date()
        .returning(|student_id, _| Ok(vec![self_dismissal_row(10, student_id, None)]));
    checkout_repo
        .expect_get_checkout_event()
        .returning(|_, _| Ok(None));

    let payload = ConfirmCheckoutRequest {
        student_id: 5,
        collector_id: Some(7),
        pickup_right_id: Some(20),
        self_dismissal: false,
        comment: None,
    };

    let result =
        confirm_with_mocks(&permission_repo, &checkout_repo, payload, dt(2025, 1, 15, 16, 0)).await;

    assert!(matches!(result, Err(HortError::NotAuthorized(_))));
}

#[tokio::test]
async fn test_confirm_without_actor_ids_is_rejected() {
    let permission_repo = MockPermissionRepo::new();
    let checkout_repo = MockCheckoutRepo::new();

    let payload = ConfirmCheckoutRequest {
        student_id: 5,
        collector_id: Some(7),
        pickup_right_id: None,
        self_dismissal: false,
        comment: None,
    };

    let result =
        confirm_with_mocks(&permission_repo, &checkout_repo, payload, dt(2025, 1, 15, 16, 0)).await;

    assert!(matches!(result, Err(HortError::Validation(_))));
}
