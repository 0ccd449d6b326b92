//! Validated settings structures

use crate::schema::{RawConfig, RawLocationProvider, RawNotifications, RawServiceConfig};
use attend_api::OfficeLocation;
use attend_util::data_dir_without_env;
use std::path::PathBuf;
use std::time::Duration;

/// Default seconds between reconciliation passes
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default seconds to wait for a position fix
pub const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 10;

/// Default seconds to wait for an API response
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default notification command
pub const DEFAULT_NOTIFY_COMMAND: &str = "notify-send";

/// Validated settings ready for use by the daemon
#[derive(Debug, Clone)]
pub struct Settings {
    /// Office geofence
    pub office: OfficeLocation,

    /// Service configuration
    pub service: ServiceConfig,

    /// Where positions come from
    pub location: LocationSource,

    /// Desktop notifications
    pub notifications: NotificationConfig,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            office: OfficeLocation::new(
                raw.office.latitude,
                raw.office.longitude,
                raw.office.radius_meters,
            ),
            service: ServiceConfig::from_raw(raw.service),
            location: LocationSource::from_raw(raw.location.provider),
            notifications: NotificationConfig::from_raw(raw.notifications),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Attendance API base URL, without trailing slash
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub location_timeout: Duration,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            api_base_url: raw
                .api_base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or_default(),
            poll_interval: Duration::from_secs(
                raw.poll_interval_seconds
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            location_timeout: Duration::from_secs(
                raw.location_timeout_seconds
                    .unwrap_or(DEFAULT_LOCATION_TIMEOUT_SECS),
            ),
            request_timeout: Duration::from_secs(
                raw.request_timeout_seconds
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            data_dir: raw.data_dir.unwrap_or_else(data_dir_without_env),
        }
    }
}

/// Source of position fixes
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    /// External command printing `latitude,longitude[,accuracy]`
    Command { argv: Vec<String> },
    /// Fixed coordinates
    Static { latitude: f64, longitude: f64 },
    /// No geolocation on this host
    Disabled,
}

impl LocationSource {
    fn from_raw(raw: RawLocationProvider) -> Self {
        match raw {
            RawLocationProvider::Command { argv } => LocationSource::Command { argv },
            RawLocationProvider::Static {
                latitude,
                longitude,
            } => LocationSource::Static {
                latitude,
                longitude,
            },
            RawLocationProvider::None => LocationSource::Disabled,
        }
    }
}

/// Desktop notification configuration
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub command: String,
}

impl NotificationConfig {
    fn from_raw(raw: RawNotifications) -> Self {
        Self {
            enabled: raw.enabled,
            command: raw
                .command
                .unwrap_or_else(|| DEFAULT_NOTIFY_COMMAND.to_string()),
        }
    }
}
