//! Time-of-day wire format helpers.
//!
//! The client sends and expects clock times as `"HH:MM"` strings (the
//! backend historically also emitted `"HH:MM:SS"`); chrono's default serde
//! representation for `NaiveTime` only accepts the seconds form, so the wire
//! DTOs use these helpers instead.

use chrono::NaiveTime;

/// Parses a `"HH:MM"` or `"HH:MM:SS"` clock time.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("invalid time of day: {value:?}"))
}

/// Formats a clock time as `"HH:MM"`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Serde adapter for `Option<NaiveTime>` fields carried as `"HH:MM"` strings.
pub mod opt_hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&super::format_hhmm(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            Some(s) => super::parse_time_of_day(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
