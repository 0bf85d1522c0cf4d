//! Timestamp handling
//!
//! Records carry millisecond precision; documents render timestamps as
//! `YYYY-MM-DDTHH:MM:SS.sssZ` so a write/read cycle is lossless.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Current time truncated to milliseconds
pub fn now_millis() -> DateTime<Utc> {
    truncate_millis(Utc::now())
}

/// Drop sub-millisecond precision
pub fn truncate_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Render a timestamp the way documents store it
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Years a document timestamp can hold; outside them the rendered form
/// needs a sign and a fifth digit
const YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Keep only timestamps that survive a render/parse cycle
fn in_range(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    YEARS.contains(&ts.year()).then_some(ts)
}

/// Parse a textual timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC) and
/// bare dates (midnight UTC). Years outside 0000-9999 are rejected.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    parse_text(s).and_then(in_range)
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(truncate_millis(dt.with_timezone(&Utc)));
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(truncate_millis(naive.and_utc()));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Interpret an untyped value as a timestamp: strings are parsed, numbers are
/// epoch milliseconds. The same year range as [`parse_timestamp`] applies.
pub fn timestamp_from_value(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => parse_timestamp(s),
        serde_json::Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis).and_then(in_range)
        }
        _ => None,
    }
}

/// Absolute difference between two timestamps in milliseconds
pub fn drift_ms(a: &DateTime<Utc>, b: &DateTime<Utc>) -> i64 {
    (*a - *b).num_milliseconds().abs()
}
