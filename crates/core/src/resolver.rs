//! # Daily Authorization Resolver
//!
//! Pure logic deciding, for one student and one instant, who may take the
//! student home today. The caller fetches the student's permissions and
//! whether a checkout event already exists; this module derives the rest.
//!
//! Resolution rules:
//!
//! 1. Only `ACTIVE` permissions whose validity window contains the
//!    calendar date of `as_of` count. The window is inclusive on both
//!    ends; a missing bound is open-ended.
//! 2. A self-dismissal permission's effective threshold for the day is the
//!    weekly table entry for the weekday if present, else its single
//!    `allowed_from_time`, else none (allowed any time).
//! 3. When several self-dismissal permissions apply, the earliest (most
//!    permissive) threshold wins; ties go to the most recently created
//!    record. No threshold counts as earlier than any threshold.
//! 4. Every applicable pickup right is listed, each with its own
//!    threshold. No dedup across collectors.
//!
//! The resolver never mutates anything and is safe to call repeatedly.

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime};

use crate::errors::{HortError, HortResult};
use crate::models::checkout::{AuthorizedCollector, CheckoutActor, DailyAuthorization};
use crate::models::permission::{Permission, PermissionKind, PermissionStatus};
use crate::timefmt;

/// Whether the permission's validity window contains the given instant's
/// calendar date. Date-granular: a permission valid until 14:00 of a day
/// still covers the whole day.
fn covers_date(permission: &Permission, as_of: NaiveDateTime) -> bool {
    let date = as_of.date();
    let starts_by = permission
        .valid_from
        .is_none_or(|from| from.date() <= date);
    let ends_after = permission
        .valid_until
        .is_none_or(|until| until.date() >= date);
    starts_by && ends_after
}

/// The self-dismissal threshold effective on `as_of`'s weekday.
fn self_dismissal_threshold(permission: &Permission, as_of: NaiveDateTime) -> Option<NaiveTime> {
    if let Some(weekly) = &permission.weekly_allowed_from {
        if let Some(time) = weekly.for_weekday(as_of.date().weekday()) {
            return Some(time);
        }
    }
    permission.allowed_from_time
}

/// Computes the per-day authorization snapshot for one student.
///
/// `permissions` is the student's permission set (any status, any window;
/// filtering happens here so the function is total over its inputs).
/// `already_checked_out` is whether a checkout event exists for `as_of`'s
/// date. Pure and side-effect free.
pub fn resolve_daily_authorization(
    permissions: &[Permission],
    already_checked_out: bool,
    as_of: NaiveDateTime,
) -> DailyAuthorization {
    let mut best_self: Option<(&Permission, Option<NaiveTime>)> = None;
    let mut allowed_collectors = Vec::new();

    for permission in permissions {
        if permission.status != PermissionStatus::Active || !covers_date(permission, as_of) {
            continue;
        }

        match &permission.kind {
            PermissionKind::SelfDismissal => {
                let threshold = self_dismissal_threshold(permission, as_of);
                let wins = match &best_self {
                    None => true,
                    Some((current, current_threshold)) => {
                        match (threshold, current_threshold) {
                            // None = allowed any time, the most permissive
                            (None, Some(_)) => true,
                            (Some(_), None) => false,
                            (None, None) => permission.created_at > current.created_at,
                            (Some(a), Some(b)) => {
                                a < *b || (a == *b && permission.created_at > current.created_at)
                            }
                        }
                    }
                };
                if wins {
                    best_self = Some((permission, threshold));
                }
            }
            PermissionKind::CollectorPickupRight {
                collector,
                main_collector,
            } => {
                allowed_collectors.push(AuthorizedCollector {
                    collector_id: collector.id,
                    first_name: collector.first_name.clone(),
                    last_name: collector.last_name.clone(),
                    phone: collector.phone.clone(),
                    main_collector: *main_collector,
                    allowed_from_time: permission.allowed_from_time,
                    pickup_right_id: permission.id,
                });
            }
        }
    }

    match best_self {
        Some((permission, threshold)) => DailyAuthorization {
            can_leave_alone_today: true,
            allowed_to_leave_from_time: threshold,
            self_dismissal_id: Some(permission.id),
            allowed_collectors,
            already_checked_out_today: already_checked_out,
        },
        None => DailyAuthorization {
            can_leave_alone_today: false,
            allowed_to_leave_from_time: None,
            self_dismissal_id: None,
            allowed_collectors,
            already_checked_out_today: already_checked_out,
        },
    }
}

/// Validates a confirmation attempt against the resolved authorization.
///
/// Enforces the per-day state machine (`NOT_CHECKED_OUT -> CHECKED_OUT`,
/// terminal) and the actor/threshold checks. The storage layer still backs
/// the uniqueness with a constraint; this is the first, advisory check.
pub fn authorize_checkout(
    authorization: &DailyAuthorization,
    actor: &CheckoutActor,
    as_of: NaiveDateTime,
) -> HortResult<()> {
    if authorization.already_checked_out_today {
        return Err(HortError::AlreadyCheckedOut(
            "student is already checked out today".to_string(),
        ));
    }

    match actor {
        CheckoutActor::SelfDismissal => {
            if !authorization.can_leave_alone_today {
                return Err(HortError::NotAuthorized(
                    "student may not leave alone today".to_string(),
                ));
            }
            if let Some(threshold) = authorization.allowed_to_leave_from_time {
                if as_of.time() < threshold {
                    return Err(HortError::NotAuthorized(format!(
                        "student may not leave alone before {}",
                        timefmt::format_hhmm(threshold)
                    )));
                }
            }
            Ok(())
        }
        CheckoutActor::Collector {
            collector_id,
            pickup_right_id,
        } => {
            let entry = authorization
                .allowed_collectors
                .iter()
                .find(|c| c.collector_id == *collector_id && c.pickup_right_id == *pickup_right_id)
                .ok_or_else(|| {
                    HortError::NotAuthorized(format!(
                        "collector {collector_id} is not authorized for this student today"
                    ))
                })?;

            if let Some(threshold) = entry.allowed_from_time {
                if as_of.time() < threshold {
                    return Err(HortError::NotAuthorized(format!(
                        "collector {} {} may not pick up before {}",
                        entry.first_name,
                        entry.last_name,
                        timefmt::format_hhmm(threshold)
                    )));
                }
            }
            Ok(())
        }
    }
}

/// Convenience for handlers: the local wall clock as a naive datetime,
/// the instant all daily resolution is keyed on.
///
/// Thresholds like "may leave from 15:00" and the per-day checkout date
/// mean the clock on the facility's wall, so the service resolves against
/// its local timezone (set via the `TZ` environment variable in
/// deployment), not UTC.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}
