//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Office geofence
    pub office: RawOffice,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Where positions come from
    #[serde(default)]
    pub location: RawLocationConfig,

    /// Desktop notifications
    #[serde(default)]
    pub notifications: RawNotifications,
}

/// Office coordinate and geofence radius
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawOffice {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Attendance API base URL, e.g. `https://attendance.example.com/api`
    pub api_base_url: Option<String>,

    /// Seconds between reconciliation passes (default: 30)
    pub poll_interval_seconds: Option<u64>,

    /// Seconds to wait for a position fix (default: 10)
    pub location_timeout_seconds: Option<u64>,

    /// Seconds to wait for an API response (default: 15)
    pub request_timeout_seconds: Option<u64>,

    /// Data directory for the store
    pub data_dir: Option<PathBuf>,
}

/// Location source settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawLocationConfig {
    #[serde(default)]
    pub provider: RawLocationProvider,
}

/// Raw location provider
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawLocationProvider {
    /// Run a command that prints `latitude,longitude[,accuracy]`
    Command { argv: Vec<String> },
    /// Fixed coordinates (desk machines that never move)
    Static { latitude: f64, longitude: f64 },
    /// No location source; every pass reports geolocation as unsupported
    #[default]
    None,
}

/// Notification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawNotifications {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Notification command (default: notify-send)
    pub command: Option<String>,
}

impl Default for RawNotifications {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
        }
    }
}

fn default_true() -> bool {
    true
}
