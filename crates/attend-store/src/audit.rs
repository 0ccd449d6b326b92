//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use attend_util::SessionId;
use std::fmt;

/// Types of audit events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Daemon started
    ServiceStarted,

    /// Daemon stopped
    ServiceStopped,

    /// A token was saved by `attendd login`
    TokenSaved,

    /// The token was removed by `attendd logout`
    TokenCleared,

    /// Reconciliation session started
    SessionStarted { session_id: SessionId },

    /// Reconciliation session ended
    SessionEnded { session_id: SessionId, reason: String },

    /// The service rejected the token
    SessionRevoked { session_id: SessionId },

    /// Check-in confirmed by the service
    CheckedIn {
        session_id: SessionId,
        date: String,
        distance_meters: f64,
    },

    /// Check-out accepted by the service
    CheckedOut {
        session_id: SessionId,
        date: String,
        distance_meters: f64,
    },

    /// Check-in call failed or was not confirmed
    CheckInFailed { session_id: SessionId, error: String },

    /// Check-out call failed
    CheckOutFailed { session_id: SessionId, error: String },
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEventType::ServiceStarted => write!(f, "service started"),
            AuditEventType::ServiceStopped => write!(f, "service stopped"),
            AuditEventType::TokenSaved => write!(f, "token saved"),
            AuditEventType::TokenCleared => write!(f, "token cleared"),
            AuditEventType::SessionStarted { session_id } => {
                write!(f, "session {} started", session_id)
            }
            AuditEventType::SessionEnded { session_id, reason } => {
                write!(f, "session {} ended ({})", session_id, reason)
            }
            AuditEventType::SessionRevoked { session_id } => {
                write!(f, "session {} rejected by service", session_id)
            }
            AuditEventType::CheckedIn {
                date,
                distance_meters,
                ..
            } => write!(f, "checked in for {} at {:.0} m", date, distance_meters),
            AuditEventType::CheckedOut {
                date,
                distance_meters,
                ..
            } => write!(f, "checked out for {} at {:.0} m", date, distance_meters),
            AuditEventType::CheckInFailed { error, .. } => write!(f, "check-in failed: {}", error),
            AuditEventType::CheckOutFailed { error, .. } => {
                write!(f, "check-out failed: {}", error)
            }
        }
    }
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: attend_util::now(),
            event,
        }
    }
}
