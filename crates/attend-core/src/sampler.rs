//! One-shot location sampling with a deadline

use attend_api::LocationSample;
use attend_host_api::{LocationError, LocationProvider, LocationResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Wraps the platform provider so every query yields exactly one sample or
/// one failure within `timeout`.
pub struct LocationSampler {
    provider: Arc<dyn LocationProvider>,
    timeout: Duration,
}

impl LocationSampler {
    pub fn new(provider: Arc<dyn LocationProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn sample(&self) -> LocationResult<LocationSample> {
        if !self.provider.is_available() {
            return Err(LocationError::Unavailable(
                "no geolocation capability".into(),
            ));
        }

        let position = tokio::time::timeout(self.timeout, self.provider.current_position())
            .await
            .map_err(|_| LocationError::Timeout(self.timeout))??;

        let sample = LocationSample::from_position(position, attend_util::now());
        debug!(
            latitude = sample.latitude,
            longitude = sample.longitude,
            accuracy = ?sample.accuracy_meters,
            "Location sampled"
        );
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attend_host_api::MockLocationProvider;

    #[tokio::test]
    async fn returns_provider_position() {
        let provider = Arc::new(MockLocationProvider::at(11.6446, 78.1223));
        let sampler = LocationSampler::new(provider.clone(), Duration::from_secs(10));

        let sample = sampler.sample().await.unwrap();
        assert_eq!(sample.latitude, 11.6446);
        assert_eq!(sample.longitude, 78.1223);
        assert_eq!(provider.query_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_without_querying() {
        let provider = Arc::new(MockLocationProvider::unavailable());
        let sampler = LocationSampler::new(provider.clone(), Duration::from_secs(10));

        let err = sampler.sample().await.unwrap_err();
        assert!(matches!(err, LocationError::Unavailable(_)));
        assert_eq!(provider.query_count(), 0);
    }

    #[tokio::test]
    async fn denied_passes_through() {
        let provider = Arc::new(MockLocationProvider::at(0.0, 0.0));
        provider.fail_with(LocationError::Denied("User denied Geolocation".into()));
        let sampler = LocationSampler::new(provider, Duration::from_secs(10));

        assert_eq!(
            sampler.sample().await.unwrap_err(),
            LocationError::Denied("User denied Geolocation".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = Arc::new(MockLocationProvider::at(0.0, 0.0));
        provider.set_delay(Some(Duration::from_secs(60)));
        let sampler = LocationSampler::new(provider, Duration::from_secs(10));

        let started = tokio::time::Instant::now();
        let err = sampler.sample().await.unwrap_err();
        assert_eq!(err, LocationError::Timeout(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(11));
    }
}
