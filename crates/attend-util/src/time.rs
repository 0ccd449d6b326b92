//! Time utilities for attendd
//!
//! Provides the wall clock used for attendance date keys and the
//! formatting helpers used when rendering the attendance log.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `ATTEND_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations. This is useful
//! for exercising day rollover without waiting for midnight.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! ATTEND_MOCK_TIME="2025-12-25 23:59:30" attendd run
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "ATTEND_MOCK_TIME";

/// Format used by `ATTEND_MOCK_TIME`
const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match parse_mock_time(&mock_time_str) {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(chrono::Local::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    None => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = MOCK_TIME_FORMAT,
                            "Invalid mock time"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Parse a mock time string in the local timezone
pub fn parse_mock_time(s: &str) -> Option<DateTime<Local>> {
    let naive_dt = NaiveDateTime::parse_from_str(s, MOCK_TIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive_dt).single()
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Calendar-date key the attendance service files records under.
///
/// The service keys records by the UTC date (`YYYY-MM-DD`), so a local
/// evening can already belong to the next day's record.
pub fn today_key(now: &DateTime<Local>) -> String {
    now.with_timezone(&Utc).format("%Y-%m-%d").to_string()
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Parse a service timestamp (RFC 3339) into local time
pub fn parse_timestamp(s: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

/// Render a log timestamp as local wall-clock time.
///
/// Absent values render as `-`; values that cannot be parsed are shown verbatim.
pub fn format_log_time(value: Option<&str>) -> String {
    match value.map(str::trim) {
        None | Some("") => "-".to_string(),
        Some(raw) => match parse_timestamp(raw) {
            Some(dt) => dt.format("%H:%M:%S").to_string(),
            None => raw.to_string(),
        },
    }
}

/// Render a log date key.
///
/// The service owns the date format, so keys are shown verbatim.
pub fn format_log_date(value: Option<&str>) -> String {
    match value.map(str::trim) {
        None | Some("") => "-".to_string(),
        Some(raw) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset};

    #[test]
    fn test_format_datetime_full() {
        let dt = Local.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(format_datetime_full(&dt), "2025-12-25 14:30:45");
    }

    #[test]
    fn test_now_returns_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }

    #[test]
    fn test_mock_time_env_var_name() {
        assert_eq!(MOCK_TIME_ENV_VAR, "ATTEND_MOCK_TIME");
    }

    #[test]
    fn test_parse_mock_time() {
        assert!(parse_mock_time("2025-12-25 14:30:00").is_some());
        assert!(parse_mock_time("2025-01-01 00:00:00").is_some());

        let invalid = [
            "2025-12-25",
            "14:30:00",
            "2025/12/25 14:30:00",
            "2025-12-25T14:30:00",
            "",
            "not a date",
        ];
        for s in &invalid {
            assert!(parse_mock_time(s).is_none(), "Expected '{}' to be rejected", s);
        }
    }

    #[test]
    fn test_today_key_uses_utc_date() {
        // 23:30 at UTC-05:00 is already the next day in UTC
        let evening = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, 23, 30, 0)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(today_key(&evening), "2025-03-11");
    }

    #[test]
    fn test_format_log_time() {
        assert_eq!(format_log_time(None), "-");
        assert_eq!(format_log_time(Some("")), "-");
        assert_eq!(format_log_time(Some("garbage")), "garbage");

        let utc = Utc.with_ymd_and_hms(2025, 3, 10, 9, 15, 0).unwrap();
        let expected = utc.with_timezone(&Local).format("%H:%M:%S").to_string();
        assert_eq!(format_log_time(Some("2025-03-10T09:15:00Z")), expected);
    }

    #[test]
    fn test_format_log_date() {
        assert_eq!(format_log_date(None), "-");
        assert_eq!(format_log_date(Some("2025-03-10")), "2025-03-10");
        assert_eq!(
            format_log_date(Some("2025-03-10T00:00:00.000Z")),
            "2025-03-10T00:00:00.000Z"
        );
        assert_eq!(format_log_date(Some("March 10")), "March 10");
    }
}
