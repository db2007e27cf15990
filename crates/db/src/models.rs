use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hort_core::models::permission::{
    Collector, Permission, PermissionKind, PermissionStatus, WeeklyAllowedFrom,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbGroup {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Student row joined with its group name, as needed by the listing and
/// checkout-search screens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStudentWithGroup {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCollector {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Permission row left-joined with its collector (pickup rights only).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPermission {
    pub id: i64,
    pub student_id: i64,
    pub kind: String,
    pub collector_id: Option<i64>,
    pub main_collector: bool,
    pub valid_from: Option<NaiveDateTime>,
    pub valid_until: Option<NaiveDateTime>,
    pub allowed_from_time: Option<NaiveTime>,
    pub allowed_monday: Option<NaiveTime>,
    pub allowed_tuesday: Option<NaiveTime>,
    pub allowed_wednesday: Option<NaiveTime>,
    pub allowed_thursday: Option<NaiveTime>,
    pub allowed_friday: Option<NaiveTime>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub collector_first_name: Option<String>,
    pub collector_last_name: Option<String>,
    pub collector_address: Option<String>,
    pub collector_phone: Option<String>,
}

impl DbPermission {
    fn weekly_allowed_from(&self) -> Option<WeeklyAllowedFrom> {
        let weekly = WeeklyAllowedFrom {
            monday: self.allowed_monday,
            tuesday: self.allowed_tuesday,
            wednesday: self.allowed_wednesday,
            thursday: self.allowed_thursday,
            friday: self.allowed_friday,
        };
        if weekly.is_empty() { None } else { Some(weekly) }
    }

    /// Converts the joined row into the domain model, rejecting rows that
    /// violate the kind invariants (a pickup right without its collector).
    pub fn into_domain(self) -> eyre::Result<Permission> {
        let kind = match self.kind.as_str() {
            "SELF_DISMISSAL" => PermissionKind::SelfDismissal,
            "COLLECTOR" => {
                let collector_id = self
                    .collector_id
                    .ok_or_else(|| eyre!("pickup right {} has no collector", self.id))?;
                PermissionKind::CollectorPickupRight {
                    collector: Collector {
                        id: collector_id,
                        first_name: self
                            .collector_first_name
                            .clone()
                            .ok_or_else(|| eyre!("collector {collector_id} has no first name"))?,
                        last_name: self
                            .collector_last_name
                            .clone()
                            .ok_or_else(|| eyre!("collector {collector_id} has no last name"))?,
                        address: self.collector_address.clone(),
                        phone: self.collector_phone.clone(),
                    },
                    main_collector: self.main_collector,
                }
            }
            other => return Err(eyre!("unknown permission kind: {other}")),
        };

        let status = match self.status.as_str() {
            "ACTIVE" => PermissionStatus::Active,
            "INACTIVE" => PermissionStatus::Inactive,
            other => return Err(eyre!("unknown permission status: {other}")),
        };

        let weekly_allowed_from = self.weekly_allowed_from();

        Ok(Permission {
            id: self.id,
            student_id: self.student_id,
            kind,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            allowed_from_time: self.allowed_from_time,
            weekly_allowed_from,
            status,
            created_at: self.created_at,
        })
    }
}

/// Flattened row backing the admin permission listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPermissionView {
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
    pub allowed_from_time: Option<NaiveTime>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCheckoutEvent {
    pub id: i64,
    pub student_id: i64,
    pub checkout_date: NaiveDate,
    pub method: String,
    pub collector_id: Option<i64>,
    pub permission_id: Option<i64>,
    pub comment: Option<String>,
    pub confirmed_at: DateTime<Utc>,
}
