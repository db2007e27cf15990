use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{HortError, HortResult};
use crate::timefmt;

/// A person authorized to pick up a student. Collectors only exist in the
/// scope of a pickup-right permission or an onboarding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collector {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Per-weekday self-dismissal thresholds for permissions spanning several
/// days. Weekend entries are not modeled; the program only runs Mon-Fri.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAllowedFrom {
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub monday: Option<NaiveTime>,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub tuesday: Option<NaiveTime>,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub wednesday: Option<NaiveTime>,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub thursday: Option<NaiveTime>,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub friday: Option<NaiveTime>,
}

impl WeeklyAllowedFrom {
    pub fn for_weekday(&self, weekday: Weekday) -> Option<NaiveTime> {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.monday.is_none()
            && self.tuesday.is_none()
            && self.wednesday.is_none()
            && self.thursday.is_none()
            && self.friday.is_none()
    }
}

/// The two shapes of a permission: a named collector may pick the student
/// up, or the student may leave on their own.
#[derive(Debug, Clone, PartialEq)]
pub enum PermissionKind {
    CollectorPickupRight {
        collector: Collector,
        main_collector: bool,
    },
    SelfDismissal,
}

impl PermissionKind {
    /// Storage/wire discriminator (`COLLECTOR` / `SELF_DISMISSAL`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::CollectorPickupRight { .. } => "COLLECTOR",
            PermissionKind::SelfDismissal => "SELF_DISMISSAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionStatus {
    Active,
    Inactive,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Active => "ACTIVE",
            PermissionStatus::Inactive => "INACTIVE",
        }
    }
}

/// An authorization record. Immutable after creation except for the
/// `status` transition `ACTIVE -> INACTIVE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Permission {
    pub id: i64,
    pub student_id: i64,
    pub kind: PermissionKind,
    /// Inclusive start of the validity window; `None` means open start.
    pub valid_from: Option<NaiveDateTime>,
    /// Inclusive end of the validity window; `None` means unbounded.
    pub valid_until: Option<NaiveDateTime>,
    pub allowed_from_time: Option<NaiveTime>,
    pub weekly_allowed_from: Option<WeeklyAllowedFrom>,
    pub status: PermissionStatus,
    pub created_at: DateTime<Utc>,
}

/// Flattened permission row for the admin listing, joined with student,
/// group and collector data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionViewDto {
    pub permission_id: i64,
    pub permission_kind: String,
    pub student_id: i64,
    pub student_first_name: String,
    pub student_last_name: String,
    pub student_group_name: Option<String>,
    pub collector_id: Option<i64>,
    pub collector_first_name: Option<String>,
    pub collector_last_name: Option<String>,
    pub collector_phone: Option<String>,
    pub valid_from: Option<NaiveDateTime>,
    pub valid_until: Option<NaiveDateTime>,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub allowed_from_time: Option<NaiveTime>,
    pub status: String,
}

/// Collector details embedded in a new pickup-right request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollector {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for `POST /api/permissions`.
///
/// `kind` distinguishes single-day ("TAGES") from long-running ("DAUER")
/// authorizations; `canLeaveAlone` selects self-dismissal vs pickup right.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermissionRequest {
    pub student_id: i64,
    pub kind: String,
    pub can_leave_alone: bool,
    #[serde(default)]
    pub valid_from: Option<NaiveDateTime>,
    #[serde(default)]
    pub valid_until: Option<NaiveDateTime>,
    #[serde(default)]
    pub collector: Option<NewCollector>,
    #[serde(default)]
    pub weekly_allowed_from: Option<WeeklyAllowedFrom>,
    #[serde(default, with = "timefmt::opt_hhmm")]
    pub allowed_from_time: Option<NaiveTime>,
}

impl NewPermissionRequest {
    /// Validates the request against the permission invariants and returns
    /// every violated field at once.
    ///
    /// Rules:
    /// - `kind` must be `TAGES` or `DAUER`
    /// - `validFrom <= validUntil` when both are present
    /// - at most one of `allowedFromTime` / `weeklyAllowedFrom` is set
    /// - pickup rights require a collector with non-empty names and must
    ///   not carry a weekly table
    /// - self-dismissal requests must not carry collector details
    pub fn validate(&self) -> HortResult<()> {
        let mut violations: Vec<&str> = Vec::new();

        if self.kind != "TAGES" && self.kind != "DAUER" {
            violations.push("kind");
        }

        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if from > until {
                violations.push("validFrom");
                violations.push("validUntil");
            }
        }

        let has_weekly = self
            .weekly_allowed_from
            .as_ref()
            .is_some_and(|w| !w.is_empty());

        if self.allowed_from_time.is_some() && has_weekly {
            violations.push("allowedFromTime");
            violations.push("weeklyAllowedFrom");
        }

        if self.can_leave_alone {
            if self.collector.is_some() {
                violations.push("collector");
            }
        } else {
            match &self.collector {
                Some(collector) => {
                    if collector.first_name.trim().is_empty() {
                        violations.push("collector.firstName");
                    }
                    if collector.last_name.trim().is_empty() {
                        violations.push("collector.lastName");
                    }
                }
                None => violations.push("collector"),
            }
            if has_weekly {
                violations.push("weeklyAllowedFrom");
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            // A field can be pushed by more than one rule; report it once.
            let mut unique: Vec<&str> = Vec::with_capacity(violations.len());
            for field in violations {
                if !unique.contains(&field) {
                    unique.push(field);
                }
            }
            Err(HortError::invalid_fields(&unique))
        }
    }

    /// The weekly table with an all-empty table normalized away.
    pub fn normalized_weekly(&self) -> Option<&WeeklyAllowedFrom> {
        self.weekly_allowed_from.as_ref().filter(|w| !w.is_empty())
    }

    /// Storage discriminator derived from `canLeaveAlone`.
    pub fn permission_kind(&self) -> &'static str {
        if self.can_leave_alone {
            "SELF_DISMISSAL"
        } else {
            "COLLECTOR"
        }
    }
}
