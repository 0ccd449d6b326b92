//! Mock host adapters for testing

use async_trait::async_trait;
use attend_api::Position;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    LocationError, LocationProvider, LocationResult, NotificationPermission, NotificationSink,
    NotifyError, NotifyResult,
};

/// Mock geolocation provider for unit/integration testing
pub struct MockLocationProvider {
    queries: AtomicU64,

    /// Result returned by the next queries
    pub result: Arc<Mutex<LocationResult<Position>>>,

    /// Simulated acquisition latency
    pub delay: Arc<Mutex<Option<Duration>>>,

    /// Whether the device reports a location capability
    pub available: Arc<Mutex<bool>>,
}

impl MockLocationProvider {
    /// A provider that always reports the given coordinates
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            queries: AtomicU64::new(0),
            result: Arc::new(Mutex::new(Ok(Position::new(latitude, longitude)))),
            delay: Arc::new(Mutex::new(None)),
            available: Arc::new(Mutex::new(true)),
        }
    }

    /// A provider on a device without geolocation
    pub fn unavailable() -> Self {
        let provider = Self::at(0.0, 0.0);
        *provider.available.lock().unwrap() = false;
        provider
    }

    /// Move the simulated device
    pub fn move_to(&self, latitude: f64, longitude: f64) {
        *self.result.lock().unwrap() = Ok(Position::new(latitude, longitude));
    }

    /// Make subsequent queries fail
    pub fn fail_with(&self, error: LocationError) {
        *self.result.lock().unwrap() = Err(error);
    }

    /// Set simulated acquisition latency
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Number of position queries received
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for MockLocationProvider {
    fn is_available(&self) -> bool {
        *self.available.lock().unwrap()
    }

    async fn current_position(&self) -> LocationResult<Position> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.result.lock().unwrap().clone()
    }
}

/// Mock notification sink for unit/integration testing
pub struct MockNotificationSink {
    permission: Arc<Mutex<NotificationPermission>>,

    /// Answer given when permission is requested
    pub request_answer: Arc<Mutex<NotificationPermission>>,

    /// Configure display to fail
    pub fail_show: Arc<Mutex<bool>>,

    requests: AtomicU64,
    shown: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockNotificationSink {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission: Arc::new(Mutex::new(permission)),
            request_answer: Arc::new(Mutex::new(NotificationPermission::Granted)),
            fail_show: Arc::new(Mutex::new(false)),
            requests: AtomicU64::new(0),
            shown: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn granted() -> Self {
        Self::new(NotificationPermission::Granted)
    }

    /// Set what the simulated user answers to a permission prompt
    pub fn answer_requests_with(&self, answer: NotificationPermission) {
        *self.request_answer.lock().unwrap() = answer;
    }

    /// Notifications displayed so far as (title, body)
    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }

    /// Number of permission prompts shown
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for MockNotificationSink {
    fn permission(&self) -> NotificationPermission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> NotificationPermission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let answer = *self.request_answer.lock().unwrap();
        *self.permission.lock().unwrap() = answer;
        answer
    }

    async fn show(&self, title: &str, body: &str) -> NotifyResult<()> {
        if *self.fail_show.lock().unwrap() {
            return Err(NotifyError::Backend("Mock display failure".into()));
        }
        if self.permission() != NotificationPermission::Granted {
            return Err(NotifyError::PermissionDenied);
        }

        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_location_moves() {
        let provider = MockLocationProvider::at(1.0, 2.0);
        assert_eq!(provider.current_position().await.unwrap(), Position::new(1.0, 2.0));

        provider.move_to(3.0, 4.0);
        assert_eq!(provider.current_position().await.unwrap(), Position::new(3.0, 4.0));
        assert_eq!(provider.query_count(), 2);
    }

    #[tokio::test]
    async fn mock_location_failure() {
        let provider = MockLocationProvider::at(1.0, 2.0);
        provider.fail_with(LocationError::Denied("User denied Geolocation".into()));

        let result = provider.current_position().await;
        assert!(matches!(result, Err(LocationError::Denied(_))));
    }

    #[tokio::test]
    async fn mock_sink_request_updates_permission() {
        let sink = MockNotificationSink::new(NotificationPermission::Undetermined);
        sink.answer_requests_with(NotificationPermission::Denied);

        assert_eq!(sink.request_permission().await, NotificationPermission::Denied);
        assert_eq!(sink.permission(), NotificationPermission::Denied);
        assert!(sink.show("t", "b").await.is_err());
        assert!(sink.shown().is_empty());
    }
}
