//! Location providers for Linux hosts

use async_trait::async_trait;
use attend_api::Position;
use attend_config::LocationSource;
use attend_host_api::{LocationError, LocationProvider, LocationResult};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Exit status a location command uses to report that access was refused
/// (`EX_NOPERM` from sysexits.h)
pub const EXIT_PERMISSION_DENIED: i32 = 77;

/// Build the provider described by the configuration
pub fn location_provider(source: &LocationSource) -> Arc<dyn LocationProvider> {
    match source {
        LocationSource::Command { argv } => Arc::new(CommandLocationProvider::new(argv.clone())),
        LocationSource::Static {
            latitude,
            longitude,
        } => Arc::new(StaticLocationProvider::new(*latitude, *longitude)),
        LocationSource::Disabled => Arc::new(NoLocationProvider),
    }
}

/// Runs an external command that prints `latitude,longitude[,accuracy]`.
///
/// Works with anything from a GeoClue helper to a GPS daemon client. The
/// child is killed if the caller stops waiting.
pub struct CommandLocationProvider {
    argv: Vec<String>,
}

impl CommandLocationProvider {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

#[async_trait]
impl LocationProvider for CommandLocationProvider {
    fn is_available(&self) -> bool {
        !self.argv.is_empty()
    }

    async fn current_position(&self) -> LocationResult<Position> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(LocationError::Unavailable("no location command".into()));
        };

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                warn!(program = %program, error = %e, "Failed to run location command");
                LocationError::Unavailable(format!("{}: {}", program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("{} exited with {}", program, output.status)
            } else {
                stderr
            };
            return Err(match output.status.code() {
                Some(EXIT_PERMISSION_DENIED) => LocationError::Denied(reason),
                _ => LocationError::Unavailable(reason),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let position = parse_position(&stdout).ok_or_else(|| {
            LocationError::Unavailable(format!("unrecognized location output: {}", stdout.trim()))
        })?;
        debug!(?position, "Location command returned");
        Ok(position)
    }
}

/// Parse the first non-empty line as `lat,lng[,accuracy]` (commas or whitespace)
pub fn parse_position(output: &str) -> Option<Position> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .map(str::parse::<f64>);

    let latitude = fields.next()?.ok()?;
    let longitude = fields.next()?.ok()?;
    let accuracy_meters = match fields.next() {
        Some(value) => Some(value.ok()?),
        None => None,
    };

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(Position {
        latitude,
        longitude,
        accuracy_meters,
    })
}

/// Fixed position, for desks that never move
pub struct StaticLocationProvider {
    position: Position,
}

impl StaticLocationProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Position::new(latitude, longitude),
        }
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn current_position(&self) -> LocationResult<Position> {
        Ok(self.position)
    }
}

/// Host without any location source
pub struct NoLocationProvider;

#[async_trait]
impl LocationProvider for NoLocationProvider {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> LocationResult<Position> {
        Err(LocationError::Unavailable("no location provider configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLocationProvider {
        CommandLocationProvider::new(vec!["sh".into(), "-c".into(), script.into()])
    }

    #[test]
    fn parse_formats() {
        assert_eq!(
            parse_position("11.6446,78.1223\n"),
            Some(Position::new(11.6446, 78.1223))
        );
        assert_eq!(
            parse_position("\n  11.6446 78.1223 25\n").unwrap().accuracy_meters,
            Some(25.0)
        );
        assert_eq!(parse_position(""), None);
        assert_eq!(parse_position("11.6446"), None);
        assert_eq!(parse_position("north,east"), None);
        assert_eq!(parse_position("91.0,0.0"), None);
        assert_eq!(parse_position("1.0,2.0,wide"), None);
    }

    #[tokio::test]
    async fn command_output_parsed() {
        let provider = sh("echo 11.6446,78.1223,15");
        let position = provider.current_position().await.unwrap();
        assert_eq!(position.latitude, 11.6446);
        assert_eq!(position.accuracy_meters, Some(15.0));
    }

    #[tokio::test]
    async fn permission_exit_is_denied() {
        let provider = sh("echo 'access refused' >&2; exit 77");
        assert_eq!(
            provider.current_position().await.unwrap_err(),
            LocationError::Denied("access refused".into())
        );
    }

    #[tokio::test]
    async fn other_failures_are_unavailable() {
        let provider = sh("exit 1");
        assert!(matches!(
            provider.current_position().await,
            Err(LocationError::Unavailable(_))
        ));

        let provider = CommandLocationProvider::new(vec!["/nonexistent/locate-me".into()]);
        assert!(matches!(
            provider.current_position().await,
            Err(LocationError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn empty_command_unavailable() {
        let provider = CommandLocationProvider::new(Vec::new());
        assert!(!provider.is_available());
        assert!(provider.current_position().await.is_err());
    }

    #[tokio::test]
    async fn provider_from_source() {
        let provider = location_provider(&LocationSource::Static {
            latitude: 1.5,
            longitude: 2.5,
        });
        assert!(provider.is_available());
        assert_eq!(
            provider.current_position().await.unwrap(),
            Position::new(1.5, 2.5)
        );

        let provider = location_provider(&LocationSource::Disabled);
        assert!(!provider.is_available());
    }
}
