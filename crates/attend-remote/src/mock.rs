//! In-memory attendance service for testing

use async_trait::async_trait;
use attend_api::{AttendanceRecord, CheckInResponse, NotificationContent};
use attend_util::SessionToken;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{AttendanceApi, RemoteError, RemoteResult};

/// Simulated attendance service.
///
/// Keeps one record per date keyed by [`attend_util::today_key`], accepts a
/// single token, and counts calls so tests can assert on remote traffic.
pub struct MockAttendanceApi {
    accepted_token: SessionToken,
    records: Arc<Mutex<Vec<AttendanceRecord>>>,

    list_calls: AtomicU64,
    check_in_calls: AtomicU64,
    check_out_calls: AtomicU64,

    /// Error returned by every list call while set
    pub list_failure: Arc<Mutex<Option<RemoteError>>>,

    /// Error returned by every check-in call while set
    pub check_in_failure: Arc<Mutex<Option<RemoteError>>>,

    /// Error returned by every check-out call while set
    pub check_out_failure: Arc<Mutex<Option<RemoteError>>>,

    /// Notification attached to successful check-ins
    pub check_in_notification: Arc<Mutex<Option<NotificationContent>>>,

    /// Simulated service latency
    pub delay: Arc<Mutex<Option<Duration>>>,
}

impl MockAttendanceApi {
    pub fn new(accepted_token: SessionToken) -> Self {
        Self {
            accepted_token,
            records: Arc::new(Mutex::new(Vec::new())),
            list_calls: AtomicU64::new(0),
            check_in_calls: AtomicU64::new(0),
            check_out_calls: AtomicU64::new(0),
            list_failure: Arc::new(Mutex::new(None)),
            check_in_failure: Arc::new(Mutex::new(None)),
            check_out_failure: Arc::new(Mutex::new(None)),
            check_in_notification: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Seed the service with existing records
    pub fn with_records(self, records: Vec<AttendanceRecord>) -> Self {
        *self.records.lock().unwrap() = records;
        self
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn set_check_in_failure(&self, error: Option<RemoteError>) {
        *self.check_in_failure.lock().unwrap() = error;
    }

    pub fn set_check_out_failure(&self, error: Option<RemoteError>) {
        *self.check_out_failure.lock().unwrap() = error;
    }

    pub fn set_list_failure(&self, error: Option<RemoteError>) {
        *self.list_failure.lock().unwrap() = error;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn list_count(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn check_in_count(&self) -> u64 {
        self.check_in_calls.load(Ordering::SeqCst)
    }

    pub fn check_out_count(&self) -> u64 {
        self.check_out_calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, token: &SessionToken, failure: &Mutex<Option<RemoteError>>) -> RemoteResult<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if token != &self.accepted_token {
            return Err(RemoteError::Unauthorized);
        }

        match failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AttendanceApi for MockAttendanceApi {
    async fn list_attendance(&self, token: &SessionToken) -> RemoteResult<Vec<AttendanceRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(token, &self.list_failure).await?;
        Ok(self.records())
    }

    async fn check_in(&self, token: &SessionToken) -> RemoteResult<CheckInResponse> {
        self.check_in_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(token, &self.check_in_failure).await?;

        let now = attend_util::now();
        let today = attend_util::today_key(&now);
        let mut records = self.records.lock().unwrap();

        if records.iter().any(|r| r.date == today) {
            return Ok(CheckInResponse {
                message: "Already checked in today".into(),
                notification: None,
            });
        }

        records.push(AttendanceRecord::checked_in(today, now.to_rfc3339()));

        Ok(CheckInResponse {
            message: "Checked in successfully".into(),
            notification: self.check_in_notification.lock().unwrap().clone(),
        })
    }

    async fn check_out(&self, token: &SessionToken) -> RemoteResult<()> {
        self.check_out_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(token, &self.check_out_failure).await?;

        let today = attend_util::today_key(&attend_util::now());
        let mut records = self.records.lock().unwrap();

        match records.iter_mut().find(|r| r.date == today && r.is_open()) {
            Some(record) => {
                record.check_out = Some(attend_util::now().to_rfc3339());
                Ok(())
            }
            None => Err(RemoteError::Status {
                code: 400,
                body: "No check-in found for today".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SessionToken {
        SessionToken::new("valid").unwrap()
    }

    #[tokio::test]
    async fn check_in_then_out() {
        let api = MockAttendanceApi::new(token());

        let response = api.check_in(&token()).await.unwrap();
        assert!(response.is_confirmed());

        let records = api.list_attendance(&token()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_open());

        api.check_out(&token()).await.unwrap();
        let records = api.records();
        assert!(!records[0].is_open());
        assert!(records[0].check_out.is_some());

        assert_eq!(api.check_in_count(), 1);
        assert_eq!(api.check_out_count(), 1);
        assert_eq!(api.list_count(), 1);
    }

    #[tokio::test]
    async fn second_check_in_not_confirmed() {
        let api = MockAttendanceApi::new(token());
        api.check_in(&token()).await.unwrap();

        let response = api.check_in(&token()).await.unwrap();
        assert!(!response.is_confirmed());
        assert_eq!(api.records().len(), 1);
    }

    #[tokio::test]
    async fn check_out_without_open_record_fails() {
        let api = MockAttendanceApi::new(token());
        let err = api.check_out(&token()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { code: 400, .. }));
    }

    #[tokio::test]
    async fn wrong_token_rejected() {
        let api = MockAttendanceApi::new(token());
        let other = SessionToken::new("stale").unwrap();

        assert_eq!(
            api.list_attendance(&other).await.unwrap_err(),
            RemoteError::Unauthorized
        );
        assert!(api.records().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_leaves_records_untouched() {
        let api = MockAttendanceApi::new(token());
        api.set_check_in_failure(Some(RemoteError::Network("offline".into())));

        assert!(api.check_in(&token()).await.is_err());
        assert!(api.records().is_empty());

        api.set_check_in_failure(None);
        assert!(api.check_in(&token()).await.unwrap().is_confirmed());
    }
}
