//! Date/time utilities for filerelay.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// strftime pattern for the timestamp segment of a storage name.
pub const STORAGE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Resolve an IANA timezone name, falling back to UTC for unknown names.
pub fn parse_timezone(timezone: &str) -> Tz {
    timezone.parse().unwrap_or(Tz::UTC)
}

/// Format a `DateTime<Utc>` in the given timezone.
///
/// # Arguments
///
/// * `dt` - DateTime in UTC
/// * `timezone` - Timezone name (e.g., "Asia/Seoul", "UTC")
/// * `format` - Output format string (e.g., "%Y/%m/%d %H:%M")
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    dt.with_timezone(&parse_timezone(timezone))
        .format(format)
        .to_string()
}

/// Render `now` as the `YYYYMMDD_HHMMSS` storage timestamp.
///
/// Sub-second precision is dropped.
pub fn storage_timestamp(now: &DateTime<Utc>, timezone: &str) -> String {
    format_utc_datetime(now, timezone, STORAGE_TIMESTAMP_FORMAT)
}
