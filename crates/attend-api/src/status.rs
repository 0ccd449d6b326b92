//! User-facing status and the engine snapshot

use attend_util::{format_log_date, format_log_time};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AttendanceRecord, AttendanceState, LocationSample, NotificationContent};

/// Status line shown to the user after each pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StatusMessage {
    /// Nothing has run yet
    #[default]
    Idle,
    /// No usable session token
    LoginRequired,
    WithinBoundary,
    OutsideBoundary,
    /// The device cannot provide a location at all
    GeolocationUnsupported,
    /// The location query failed for this tick
    LocationError(String),
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Idle => Ok(()),
            StatusMessage::LoginRequired => {
                f.write_str("Please log in or register to enable auto attendance.")
            }
            StatusMessage::WithinBoundary => f.write_str("You are within the office boundary!"),
            StatusMessage::OutsideBoundary => f.write_str("You are outside the office boundary!"),
            StatusMessage::GeolocationUnsupported => f.write_str("Geolocation not supported."),
            StatusMessage::LocationError(detail) => {
                write!(f, "Error fetching location: {}", detail)
            }
        }
    }
}

/// Everything a front end needs to render the attendance view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSnapshot {
    pub status: StatusMessage,
    pub state: AttendanceState,
    /// Last successful location sample
    pub current_location: Option<LocationSample>,
    /// In-app banner for the most recent check-in
    pub banner: Option<NotificationContent>,
    /// Attendance log as last fetched from the service
    pub log: Vec<AttendanceRecord>,
}

impl Default for AttendanceSnapshot {
    fn default() -> Self {
        Self {
            status: StatusMessage::Idle,
            state: AttendanceState::Absent,
            current_location: None,
            banner: None,
            log: Vec::new(),
        }
    }
}

impl AttendanceSnapshot {
    /// Current coordinates with six decimals, or "Not available"
    pub fn location_lines(&self) -> (String, String) {
        match &self.current_location {
            Some(sample) => (
                format!("{:.6}", sample.latitude),
                format!("{:.6}", sample.longitude),
            ),
            None => ("Not available".to_string(), "Not available".to_string()),
        }
    }
}

/// Render the attendance log as a plain-text table
pub fn render_log_table(records: &[AttendanceRecord]) -> String {
    let mut rows = vec![[
        "Date".to_string(),
        "Check-In".to_string(),
        "Check-Out".to_string(),
    ]];

    if records.is_empty() {
        let mut out = format_rows(&rows);
        out.push_str("No records found\n");
        return out;
    }

    for record in records {
        rows.push([
            format_log_date(Some(&record.date)),
            format_log_time(record.check_in.as_deref()),
            format_log_time(record.check_out.as_deref()),
        ]);
    }

    format_rows(&rows)
}

fn format_rows(rows: &[[String; 3]]) -> String {
    let mut widths = [0usize; 3];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let line = format!(
            "{:<w0$}  {:<w1$}  {:<w2$}",
            row[0],
            row[1],
            row[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text() {
        assert_eq!(
            StatusMessage::LoginRequired.to_string(),
            "Please log in or register to enable auto attendance."
        );
        assert_eq!(
            StatusMessage::LocationError("timed out".into()).to_string(),
            "Error fetching location: timed out"
        );
        assert_eq!(StatusMessage::Idle.to_string(), "");
    }

    #[test]
    fn empty_log_table() {
        let table = render_log_table(&[]);
        assert!(table.starts_with("Date"));
        assert!(table.contains("No records found"));
    }

    #[test]
    fn log_table_marks_missing_times() {
        let records = vec![AttendanceRecord {
            date: "2025-03-10".into(),
            check_in: None,
            check_out: None,
        }];
        let table = render_log_table(&records);
        let row = table.lines().nth(1).unwrap();
        assert!(row.starts_with("2025-03-10"));
        assert_eq!(row.matches('-').count(), 4); // two in the date, two placeholders
    }

    #[test]
    fn location_lines_default() {
        let snapshot = AttendanceSnapshot::default();
        assert_eq!(
            snapshot.location_lines(),
            ("Not available".to_string(), "Not available".to_string())
        );
    }
}
