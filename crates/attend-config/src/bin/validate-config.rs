//! Config validation CLI tool
//!
//! Validates an attendd configuration file and reports any errors.

use attend_config::{ConfigError, LocationSource};
use attend_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates an attendd configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match attend_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", attend_config::CURRENT_CONFIG_VERSION);
            println!(
                "  Office: {:.6}, {:.6} (radius {} m)",
                settings.office.latitude, settings.office.longitude, settings.office.radius_meters
            );
            println!("  API: {}", settings.service.api_base_url);
            println!("  Poll interval: {}s", settings.service.poll_interval.as_secs());

            let location = match &settings.location {
                LocationSource::Command { argv } => format!("command ({})", argv.join(" ")),
                LocationSource::Static {
                    latitude,
                    longitude,
                } => format!("static ({:.6}, {:.6})", latitude, longitude),
                LocationSource::Disabled => "none".to_string(),
            };
            println!("  Location: {}", location);
            println!(
                "  Notifications: {}",
                if settings.notifications.enabled {
                    settings.notifications.command.as_str()
                } else {
                    "disabled"
                }
            );

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        attend_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
