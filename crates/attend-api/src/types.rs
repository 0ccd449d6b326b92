//! Shared types for the attendance domain

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_CHECK_IN_BODY, DEFAULT_CHECK_IN_TITLE};

/// The office geofence: a circle around a fixed coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfficeLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

impl OfficeLocation {
    pub fn new(latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_meters,
        }
    }

    /// Whether a distance from the office center lies inside the geofence.
    /// The boundary itself counts as inside.
    pub fn is_within(&self, distance_meters: f64) -> bool {
        distance_meters <= self.radius_meters
    }
}

/// A raw position fix from the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy radius, if the platform provides one
    pub accuracy_meters: Option<f64>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
        }
    }
}

/// One location reading taken for a single reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub captured_at: DateTime<Local>,
}

impl LocationSample {
    pub fn from_position(position: Position, captured_at: DateTime<Local>) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            accuracy_meters: position.accuracy_meters,
            captured_at,
        }
    }
}

/// An attendance entry as owned by the attendance service.
///
/// At most one record exists per employee and date. Timestamps are kept as
/// the service sent them; see [`attend_util::parse_timestamp`] to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Calendar-date key (`YYYY-MM-DD`)
    pub date: String,

    #[serde(rename = "checkIn", default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,

    #[serde(rename = "checkOut", default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
}

impl AttendanceRecord {
    pub fn checked_in(date: impl Into<String>, at: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            check_in: Some(at.into()),
            check_out: None,
        }
    }

    fn present(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    /// Checked in and not yet checked out
    pub fn is_open(&self) -> bool {
        Self::present(&self.check_in) && !Self::present(&self.check_out)
    }

    /// Whether this record has no check-out yet (the service's open filter)
    pub fn lacks_check_out(&self) -> bool {
        !Self::present(&self.check_out)
    }
}

/// Attendance state of the employee for the current day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    /// No open record
    Absent,
    /// An open record exists
    Present,
}

impl AttendanceState {
    pub fn from_open_record(open: Option<&AttendanceRecord>) -> Self {
        if open.is_some() {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

/// What a reconciliation pass decided to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    None,
    CheckIn,
    CheckOut,
}

/// Result of one decision: the action and the distance it was based on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    pub action: ReconcileAction,
    pub distance_meters: f64,
}

/// Title and body of a user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Notification used when the service does not supply one
    pub fn default_check_in() -> Self {
        Self::new(DEFAULT_CHECK_IN_TITLE, DEFAULT_CHECK_IN_BODY)
    }
}

/// Response body of `POST /checkin`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckInResponse {
    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationContent>,
}

impl CheckInResponse {
    /// The service confirms a check-in with a message containing "Checked in"
    pub fn is_confirmed(&self) -> bool {
        self.message.contains("Checked in")
    }

    /// Notification to raise for a confirmed check-in
    pub fn notification_or_default(&self) -> NotificationContent {
        self.notification
            .clone()
            .unwrap_or_else(NotificationContent::default_check_in)
    }
}
