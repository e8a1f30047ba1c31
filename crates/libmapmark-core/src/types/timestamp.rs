//! ISO-8601 timestamp (de)serialization
//!
//! Timestamps are written as RFC 3339 in UTC. Reading is more forgiving:
//! offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` values are taken as UTC. An empty,
//! unparseable or non-string value decodes as the current time.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = crate::types::lenient::string_or(Value::deserialize(deserializer)?, "");
    Ok(parse(&raw).unwrap_or_else(|_| Utc::now()))
}

/// Parse a timestamp using the lenient rules above
pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Utc::now());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid ISO-8601 timestamp '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let ts = parse("2024-03-01T10:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_empty_is_now() {
        let before = Utc::now();
        let ts = parse("").unwrap();
        assert!(ts >= before);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse("yesterday").is_err());
    }

    #[derive(serde::Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_unreadable_values_decode_as_now() {
        let before = Utc::now();
        for raw in [r#"{"at": "yesterday"}"#, r#"{"at": null}"#, r#"{"at": 12}"#] {
            let stamped: Stamped = serde_json::from_str(raw).unwrap();
            assert!(stamped.at >= before, "{}", raw);
        }
    }
}
