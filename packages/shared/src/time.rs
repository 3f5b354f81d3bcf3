use chrono::{DateTime, SecondsFormat, Utc};

/// Current Unix timestamp in milliseconds (UTC).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix millisecond timestamp as RFC 3339 (UTC, millisecond precision).
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn millis_to_rfc3339(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
