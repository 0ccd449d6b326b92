//! Host adapter traits

use async_trait::async_trait;
use attend_api::Position;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from a location query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The device has no way to determine its position
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    /// The user or platform refused the query
    #[error("Location permission denied: {0}")]
    Denied(String),

    /// No fix arrived in time
    #[error("Location request timed out after {0:?}")]
    Timeout(Duration),
}

pub type LocationResult<T> = Result<T, LocationError>;

/// Errors from notification display
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Notification backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Notification permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// The user has not been asked yet
    Undetermined,
}

/// One-shot position query - implemented by platform-specific adapters
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Whether this provider can produce positions at all
    fn is_available(&self) -> bool {
        true
    }

    /// Query the current position.
    ///
    /// May prompt the user for permission on first use. Implementations
    /// resolve exactly once, with either a position or an error.
    async fn current_position(&self) -> LocationResult<Position>;
}

/// Desktop notification display - implemented by platform-specific adapters
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Current permission state, without prompting
    fn permission(&self) -> NotificationPermission;

    /// Ask the user for permission. Returns the resulting state.
    async fn request_permission(&self) -> NotificationPermission;

    /// Display a notification. Callers check permission first.
    async fn show(&self, title: &str, body: &str) -> NotifyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_messages() {
        let err = LocationError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Location request timed out after 10s");

        let err = LocationError::Denied("User denied Geolocation".into());
        assert!(err.to_string().contains("User denied Geolocation"));
    }

    #[test]
    fn permission_serialization() {
        let json = serde_json::to_string(&NotificationPermission::Undetermined).unwrap();
        assert_eq!(json, "\"undetermined\"");
    }
}
