//! Serialization helpers for note timestamps.
//!
//! Timestamps travel as RFC 3339 strings in UTC with millisecond precision
//! and a `Z` suffix, e.g. `2024-05-01T09:30:00.125Z`.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time truncated to the precision timestamps are serialized with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp the way it appears on the wire.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis_and_zulu() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(format(&ts), "2024-05-01T09:30:00.000Z");
    }

    #[test]
    fn now_has_no_sub_millisecond_component() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
