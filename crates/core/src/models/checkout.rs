use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timefmt;

/// A collector currently authorized to pick a student up, as shown on the
/// checkout screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedCollector {
    pub collector_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub main_collector: bool,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub allowed_from_time: Option<NaiveTime>,
    pub pickup_right_id: i64,
}

/// Per-student, per-day derived authorization state.
///
/// Produced by [`crate::resolver::resolve_daily_authorization`]; a pure
/// snapshot, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAuthorization {
    pub can_leave_alone_today: bool,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub allowed_to_leave_from_time: Option<NaiveTime>,
    /// Id of the self-dismissal permission that won the resolution, if any.
    pub self_dismissal_id: Option<i64>,
    pub allowed_collectors: Vec<AuthorizedCollector>,
    pub already_checked_out_today: bool,
}

/// One row of the checkout search screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStudentInfo {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub group_name: Option<String>,
    pub can_leave_alone_today: bool,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub allowed_to_leave_from_time: Option<NaiveTime>,
    pub self_dismissal_id: Option<i64>,
    pub allowed_collectors: Vec<AuthorizedCollector>,
    pub checked_out_today: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSearchResponse {
    pub students: Vec<CheckoutStudentInfo>,
}

/// Request body for `POST /api/checkout/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckoutRequest {
    pub student_id: i64,
    #[serde(default)]
    pub collector_id: Option<i64>,
    #[serde(default)]
    pub pickup_right_id: Option<i64>,
    pub self_dismissal: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Who is taking the student: the student themselves, or a collector
/// acting under a specific pickup right.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutActor {
    SelfDismissal,
    Collector {
        collector_id: i64,
        pickup_right_id: i64,
    },
}

/// How a recorded departure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutMethod {
    Collector,
    SelfDismissal,
}

impl CheckoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMethod::Collector => "COLLECTOR",
            CheckoutMethod::SelfDismissal => "SELF",
        }
    }
}

/// A recorded departure. At most one exists per (student, day); the
/// storage layer enforces the uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutEvent {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub method: CheckoutMethod,
    pub collector_id: Option<i64>,
    pub permission_id: Option<i64>,
    pub comment: Option<String>,
    pub confirmed_at: DateTime<Utc>,
}
