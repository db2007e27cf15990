use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, json, to_value};

use hort_core::models::checkout::ConfirmCheckoutRequest;
use hort_core::models::permission::{
    NewCollector, NewPermissionRequest, PermissionViewDto, WeeklyAllowedFrom,
};
use hort_core::models::registry::StudentOnboardingRequest;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn test_new_permission_request_deserialization_tages() {
    // The exact shape the admin client sends for a single-day
    // self-dismissal authorization.
    let payload = r#"{
        "studentId": 5,
        "kind": "TAGES",
        "canLeaveAlone": true,
        "validFrom": "2025-10-28T00:00:00",
        "validUntil": "2025-10-28T23:59:00",
        "allowedFromTime": "15:30"
    }"#;

    let request: NewPermissionRequest = from_str(payload).expect("Failed to deserialize request");

    assert_eq!(request.student_id, 5);
    assert_eq!(request.kind, "TAGES");
    assert!(request.can_leave_alone);
    assert_eq!(request.valid_from, Some(dt(2025, 10, 28, 0, 0)));
    assert_eq!(request.allowed_from_time, Some(t(15, 30)));
    assert!(request.collector.is_none());
    assert!(request.weekly_allowed_from.is_none());
}

#[test]
fn test_new_permission_request_deserialization_dauer_collector() {
    let payload = r#"{
        "studentId": 5,
        "kind": "DAUER",
        "canLeaveAlone": false,
        "validFrom": "2025-01-10T00:00:00",
        "validUntil": null,
        "collector": {
            "firstName": "Maria",
            "lastName": "Muster",
            "address": "Musterweg 1",
            "phone": "0151 2345678"
        }
    }"#;

    let request: NewPermissionRequest = from_str(payload).expect("Failed to deserialize request");

    assert_eq!(request.kind, "DAUER");
    assert!(!request.can_leave_alone);
    assert_eq!(request.valid_until, None);
    let collector = request.collector.as_ref().expect("collector missing");
    assert_eq!(collector.first_name, "Maria");
    assert_eq!(collector.phone.as_deref(), Some("0151 2345678"));
    assert_eq!(request.permission_kind(), "COLLECTOR");
}

#[test]
fn test_weekly_allowed_from_accepts_both_time_formats() {
    let weekly: WeeklyAllowedFrom =
        from_str(r#"{ "monday": "15:30", "wednesday": "13:00:00" }"#)
            .expect("Failed to deserialize weekly table");

    assert_eq!(weekly.for_weekday(Weekday::Mon), Some(t(15, 30)));
    assert_eq!(weekly.for_weekday(Weekday::Wed), Some(t(13, 0)));
    assert_eq!(weekly.for_weekday(Weekday::Tue), None);
    assert_eq!(weekly.for_weekday(Weekday::Sat), None);
}

#[test]
fn test_permission_view_dto_serializes_camel_case() {
    let view = PermissionViewDto {
        permission_id: 3,
        permission_kind: "SELF_DISMISSAL".to_string(),
        student_id: 5,
        student_first_name: "Lena".to_string(),
        student_last_name: "Beispiel".to_string(),
        student_group_name: Some("Igel".to_string()),
        collector_id: None,
        collector_first_name: None,
        collector_last_name: None,
        collector_phone: None,
        valid_from: Some(dt(2025, 1, 1, 0, 0)),
        valid_until: None,
        allowed_from_time: Some(t(15, 30)),
        status: "ACTIVE".to_string(),
    };

    let value = to_value(&view).expect("Failed to serialize view");

    assert_eq!(value["permissionId"], json!(3));
    assert_eq!(value["studentFirstName"], json!("Lena"));
    assert_eq!(value["studentGroupName"], json!("Igel"));
    assert_eq!(value["allowedFromTime"], json!("15:30"));
    assert_eq!(value["validUntil"], json!(null));
}

#[test]
fn test_confirm_checkout_request_deserialization() {
    let payload = r#"{
        "studentId": 5,
        "collectorId": null,
        "pickupRightId": null,
        "selfDismissal": true,
        "comment": null
    }"#;

    let request: ConfirmCheckoutRequest = from_str(payload).expect("Failed to deserialize request");

    assert_eq!(request.student_id, 5);
    assert!(request.self_dismissal);
    assert_eq!(request.collector_id, None);
    assert_eq!(request.comment, None);
}

#[test]
fn test_onboarding_request_deserialization() {
    let payload = r#"{
        "student": {
            "firstName": "Lena",
            "lastName": "Beispiel",
            "address": "Musterweg 2"
        },
        "groupId": 2,
        "collectors": [{
            "firstName": "Maria",
            "lastName": "Muster",
            "address": "Musterweg 1",
            "validFrom": "2025-01-01T00:00:00",
            "validUntil": null,
            "type": "COLLECTOR",
            "permissionType": "PERMANENT",
            "mainCollector": true
        }]
    }"#;

    let request: StudentOnboardingRequest =
        from_str(payload).expect("Failed to deserialize request");

    assert_eq!(request.group_id, 2);
    assert_eq!(request.collectors.len(), 1);
    assert!(request.collectors[0].main_collector);
    assert_eq!(request.collectors[0].valid_until, None);
}

fn base_request(can_leave_alone: bool) -> NewPermissionRequest {
    NewPermissionRequest {
        student_id: 5,
        kind: "TAGES".to_string(),
        can_leave_alone,
        valid_from: Some(dt(2025, 1, 10, 0, 0)),
        valid_until: Some(dt(2025, 1, 10, 23, 59)),
        collector: None,
        weekly_allowed_from: None,
        allowed_from_time: None,
    }
}

fn collector() -> NewCollector {
    NewCollector {
        first_name: "Maria".to_string(),
        last_name: "Muster".to_string(),
        address: "Musterweg 1".to_string(),
        phone: None,
    }
}

#[test]
fn test_validate_accepts_self_dismissal_with_threshold() {
    let mut request = base_request(true);
    request.allowed_from_time = Some(t(15, 0));

    assert!(request.validate().is_ok());
}

#[test]
fn test_validate_accepts_pickup_right() {
    let mut request = base_request(false);
    request.collector = Some(collector());

    assert!(request.validate().is_ok());
}

#[test]
fn test_validate_accepts_dauer_self_dismissal_with_weekly_table() {
    let mut request = base_request(true);
    request.kind = "DAUER".to_string();
    request.valid_until = None;
    request.weekly_allowed_from = Some(WeeklyAllowedFrom {
        monday: Some(t(15, 30)),
        ..Default::default()
    });

    assert!(request.validate().is_ok());
}

#[rstest]
#[case::unknown_kind(
    {
        let mut r = base_request(true);
        r.kind = "WEEKLY".to_string();
        r
    },
    &["kind"]
)]
#[case::inverted_window(
    {
        let mut r = base_request(true);
        r.valid_from = Some(dt(2025, 1, 20, 0, 0));
        r.valid_until = Some(dt(2025, 1, 10, 0, 0));
        r
    },
    &["validFrom", "validUntil"]
)]
#[case::both_threshold_shapes(
    {
        let mut r = base_request(true);
        r.allowed_from_time = Some(t(15, 0));
        r.weekly_allowed_from = Some(WeeklyAllowedFrom {
            monday: Some(t(15, 30)),
            ..Default::default()
        });
        r
    },
    &["allowedFromTime", "weeklyAllowedFrom"]
)]
#[case::pickup_right_without_collector(base_request(false), &["collector"])]
#[case::pickup_right_with_empty_names(
    {
        let mut r = base_request(false);
        r.collector = Some(NewCollector {
            first_name: "".to_string(),
            last_name: "  ".to_string(),
            address: "Musterweg 1".to_string(),
            phone: None,
        });
        r
    },
    &["collector.firstName", "collector.lastName"]
)]
#[case::self_dismissal_with_collector(
    {
        let mut r = base_request(true);
        r.collector = Some(collector());
        r
    },
    &["collector"]
)]
#[case::pickup_right_with_weekly_table(
    {
        let mut r = base_request(false);
        r.collector = Some(collector());
        r.weekly_allowed_from = Some(WeeklyAllowedFrom {
            friday: Some(t(14, 0)),
            ..Default::default()
        });
        r
    },
    &["weeklyAllowedFrom"]
)]
fn test_validate_rejects(#[case] request: NewPermissionRequest, #[case] fields: &[&str]) {
    let err = request.validate().expect_err("expected validation failure");
    let message = err.to_string();
    for field in fields {
        assert!(message.contains(field), "{message} should name {field}");
    }
}

#[test]
fn test_validate_names_each_field_once() {
    // A pickup right carrying both threshold shapes trips two rules that
    // name weeklyAllowedFrom; the message must not repeat the field.
    let mut request = base_request(false);
    request.collector = Some(collector());
    request.allowed_from_time = Some(t(15, 0));
    request.weekly_allowed_from = Some(WeeklyAllowedFrom {
        monday: Some(t(15, 30)),
        ..Default::default()
    });

    let err = request.validate().expect_err("expected validation failure");
    let message = err.to_string();
    assert_eq!(
        message.matches("weeklyAllowedFrom").count(),
        1,
        "{message} should name weeklyAllowedFrom exactly once"
    );
}

#[test]
fn test_empty_weekly_table_is_normalized_away() {
    let mut request = base_request(true);
    request.weekly_allowed_from = Some(WeeklyAllowedFrom::default());

    assert!(request.normalized_weekly().is_none());
    // An empty table does not conflict with a single threshold.
    request.allowed_from_time = Some(t(15, 0));
    assert!(request.validate().is_ok());
}
