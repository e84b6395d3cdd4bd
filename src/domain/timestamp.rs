//! Visit timestamps
//!
//! The API stores visit times as server-local wall-clock values without an
//! offset, so the client keeps them as [`NaiveDateTime`]. Input carrying an
//! RFC 3339 offset is reduced to its local wall-clock part.

use chrono::{DateTime, NaiveDateTime};

const SPACE_SEPARATED: &str = "%Y-%m-%d %H:%M:%S%.f";
const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a timestamp as sent by the API or written by the local cache
///
/// # Examples
///
/// ```
/// use rounds::domain::timestamp::parse_timestamp;
///
/// let ts = parse_timestamp("2024-05-01T09:30:00.250000").unwrap();
/// assert_eq!(ts.date().to_string(), "2024-05-01");
///
/// let with_offset = parse_timestamp("2024-05-01T23:10:00+03:00").unwrap();
/// assert_eq!(with_offset.date().to_string(), "2024-05-01");
/// ```
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, String> {
    let input = input.trim();
    if let Ok(ts) = input.parse::<NaiveDateTime>() {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(input, SPACE_SEPARATED) {
        return Ok(ts);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.naive_local())
        .map_err(|e| format!("Invalid timestamp '{input}': {e}"))
}

/// Format a timestamp the way the API emits it
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(OUTPUT_FORMAT).to_string()
}

/// Serde adapter for required timestamps
pub mod required {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional timestamps; empty strings read as `None`
pub mod optional {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
