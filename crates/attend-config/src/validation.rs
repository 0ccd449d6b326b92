//! Configuration validation

use crate::schema::{RawConfig, RawLocationProvider, RawOffice, RawServiceConfig};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid {field} {value}: {message}")]
    InvalidCoordinate {
        field: String,
        value: f64,
        message: String,
    },

    #[error("Invalid office radius {0}: must be a positive number of meters")]
    InvalidRadius(f64),

    #[error("Missing required setting: {0}")]
    MissingField(String),

    #[error("Invalid API base URL '{0}': expected http:// or https://")]
    InvalidUrl(String),

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: String },

    #[error("Location provider: {0}")]
    LocationProvider(String),

    #[error("Notifications: {0}")]
    Notifications(String),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_office(&config.office));
    errors.extend(validate_service(&config.service));

    match &config.location.provider {
        RawLocationProvider::Command { argv } => {
            if argv.first().is_none_or(|cmd| cmd.trim().is_empty()) {
                errors.push(ValidationError::LocationProvider(
                    "command argv cannot be empty".into(),
                ));
            }
        }
        RawLocationProvider::Static {
            latitude,
            longitude,
        } => {
            errors.extend(validate_coordinate("location.latitude", *latitude, 90.0));
            errors.extend(validate_coordinate("location.longitude", *longitude, 180.0));
        }
        RawLocationProvider::None => {}
    }

    if let Some(command) = &config.notifications.command
        && command.trim().is_empty()
    {
        errors.push(ValidationError::Notifications(
            "command cannot be empty".into(),
        ));
    }

    errors
}

fn validate_office(office: &RawOffice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_coordinate("office.latitude", office.latitude, 90.0));
    errors.extend(validate_coordinate("office.longitude", office.longitude, 180.0));

    if !office.radius_meters.is_finite() || office.radius_meters <= 0.0 {
        errors.push(ValidationError::InvalidRadius(office.radius_meters));
    }

    errors
}

fn validate_service(service: &RawServiceConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match service.api_base_url.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(ValidationError::MissingField("service.api_base_url".into()));
        }
        Some(url) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ValidationError::InvalidUrl(url.to_string()));
            }
        }
    }

    let intervals = [
        ("service.poll_interval_seconds", service.poll_interval_seconds),
        ("service.location_timeout_seconds", service.location_timeout_seconds),
        ("service.request_timeout_seconds", service.request_timeout_seconds),
    ];
    for (field, value) in intervals {
        if value == Some(0) {
            errors.push(ValidationError::ZeroInterval {
                field: field.to_string(),
            });
        }
    }

    errors
}

/// Check that a coordinate is finite and within `[-limit, limit]` degrees
pub fn validate_coordinate(field: &str, value: f64, limit: f64) -> Option<ValidationError> {
    if !value.is_finite() {
        return Some(ValidationError::InvalidCoordinate {
            field: field.to_string(),
            value,
            message: "must be a finite number".into(),
        });
    }
    if value.abs() > limit {
        return Some(ValidationError::InvalidCoordinate {
            field: field.to_string(),
            value,
            message: format!("must be between -{} and {}", limit, limit),
        });
    }
    None
}
