//! Reconciliation engine

use attend_api::{
    AttendanceRecord, AttendanceSnapshot, AttendanceState, OfficeLocation, ReconcileAction,
    ReconciliationOutcome, StatusMessage,
};
use attend_host_api::LocationError;
use attend_remote::{AttendanceApi, RemoteError};
use attend_store::{AuditEvent, AuditEventType, Store};
use attend_util::SessionToken;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::{
    LocationSampler, Notifier, PassError, PassReport, Session, decide, distance_to_office,
    fetch_attendance, next_state,
};

/// Clears the in-flight flag when a pass finishes, however it finishes
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The attendance engine: runs reconciliation passes and holds what the
/// user sees (status line, last location, banner, attendance log).
pub struct AttendanceEngine {
    office: OfficeLocation,
    sampler: LocationSampler,
    api: Arc<dyn AttendanceApi>,
    notifier: Notifier,
    store: Arc<dyn Store>,
    in_flight: AtomicBool,
    snapshot: Mutex<AttendanceSnapshot>,
}

impl AttendanceEngine {
    pub fn new(
        office: OfficeLocation,
        sampler: LocationSampler,
        api: Arc<dyn AttendanceApi>,
        notifier: Notifier,
        store: Arc<dyn Store>,
    ) -> Self {
        info!(
            latitude = office.latitude,
            longitude = office.longitude,
            radius_meters = office.radius_meters,
            location_timeout_secs = sampler.timeout().as_secs(),
            "Attendance engine initialized"
        );

        Self {
            office,
            sampler,
            api,
            notifier,
            store,
            in_flight: AtomicBool::new(false),
            snapshot: Mutex::new(AttendanceSnapshot::default()),
        }
    }

    pub fn office(&self) -> &OfficeLocation {
        &self.office
    }

    /// Copy of the current user-facing state
    pub fn snapshot(&self) -> AttendanceSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether a pass is currently running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn update(&self, f: impl FnOnce(&mut AttendanceSnapshot)) {
        let mut snapshot = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut snapshot);
    }

    fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to record audit event");
        }
    }

    /// Reload the attendance log. Does nothing without a usable token.
    pub async fn refresh_log(&self, session: &Session) -> Result<(), PassError> {
        let Some(token) = session.token().cloned() else {
            self.update(|s| s.status = StatusMessage::LoginRequired);
            return Ok(());
        };

        match self.api.list_attendance(&token).await {
            Ok(records) => {
                if session.is_live() {
                    self.apply_log(records);
                }
                Ok(())
            }
            Err(_) if !session.is_live() => Ok(()),
            Err(e) => Err(self.remote_failure(session, e)),
        }
    }

    fn apply_log(&self, records: Vec<AttendanceRecord>) {
        debug!(count = records.len(), "Attendance log updated");
        self.update(|s| s.log = records);
    }

    /// Run one sample -> fetch -> decide -> act pass.
    ///
    /// Never fails: every error is logged, reflected in the status line where
    /// relevant, and reported back.
    pub async fn run_pass(&self, session: &Session) -> PassReport {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(session_id = %session.id(), "Pass already in flight, tick suppressed");
            return PassReport::Suppressed;
        };

        let Some(token) = session.token().cloned() else {
            debug!(session_id = %session.id(), "No session token, skipping pass");
            self.update(|s| s.status = StatusMessage::LoginRequired);
            return PassReport::LoginRequired;
        };

        let sample = match self.sampler.sample().await {
            Ok(sample) => sample,
            Err(e) => {
                if !session.is_live() {
                    return PassReport::Discarded;
                }
                warn!(error = %e, "Location sampling failed");
                self.update(|s| s.status = location_status(&e));
                return PassReport::Failed(e.into());
            }
        };
        if !session.is_live() {
            return PassReport::Discarded;
        }

        let distance = distance_to_office(&self.office, &sample);
        let inside = self.office.is_within(distance);
        debug!(distance_meters = distance, inside, "Distance to office");
        self.update(|s| {
            s.current_location = Some(sample);
            s.status = if inside {
                StatusMessage::WithinBoundary
            } else {
                StatusMessage::OutsideBoundary
            };
        });

        let today = attend_util::today_key(&attend_util::now());
        let fetched = match fetch_attendance(self.api.as_ref(), &token, &today).await {
            Ok(fetched) => fetched,
            Err(_) if !session.is_live() => return PassReport::Discarded,
            Err(e) => return PassReport::Failed(self.remote_failure(session, e)),
        };
        if !session.is_live() {
            return PassReport::Discarded;
        }

        let state = AttendanceState::from_open_record(fetched.open.as_ref());
        self.update(|s| s.state = state);
        self.apply_log(fetched.records);

        let outcome = decide(&self.office, distance, fetched.open.as_ref());
        match outcome.action {
            ReconcileAction::None => {
                debug!(?state, "No transition needed");
                PassReport::Completed(outcome)
            }
            ReconcileAction::CheckIn => self.check_in(session, &token, &today, outcome).await,
            ReconcileAction::CheckOut => self.check_out(session, &token, &today, outcome).await,
        }
    }

    async fn check_in(
        &self,
        session: &Session,
        token: &SessionToken,
        today: &str,
        outcome: ReconciliationOutcome,
    ) -> PassReport {
        info!(distance_meters = outcome.distance_meters, "Inside office boundary, checking in");

        let response = match self.api.check_in(token).await {
            Ok(response) => response,
            Err(_) if !session.is_live() => return PassReport::Discarded,
            Err(e) => {
                self.audit(AuditEventType::CheckInFailed {
                    session_id: session.id().clone(),
                    error: e.to_string(),
                });
                return PassReport::Failed(self.remote_failure(session, e));
            }
        };
        if !session.is_live() {
            return PassReport::Discarded;
        }

        if !response.is_confirmed() {
            warn!(message = %response.message, "Check-in not confirmed by service");
            self.audit(AuditEventType::CheckInFailed {
                session_id: session.id().clone(),
                error: response.message.clone(),
            });
            return PassReport::Failed(PassError::CheckInNotConfirmed {
                message: response.message,
            });
        }

        let notification = response.notification_or_default();
        self.update(|s| {
            s.state = next_state(s.state, ReconcileAction::CheckIn);
            s.banner = Some(notification.clone());
        });
        self.audit(AuditEventType::CheckedIn {
            session_id: session.id().clone(),
            date: today.to_string(),
            distance_meters: outcome.distance_meters,
        });
        info!(date = today, "Checked in");

        self.notifier
            .notify(&notification.title, &notification.body)
            .await;
        self.refresh_after_transition(session).await;

        PassReport::Completed(outcome)
    }

    async fn check_out(
        &self,
        session: &Session,
        token: &SessionToken,
        today: &str,
        outcome: ReconciliationOutcome,
    ) -> PassReport {
        info!(distance_meters = outcome.distance_meters, "Outside office boundary, checking out");

        if let Err(e) = self.api.check_out(token).await {
            if !session.is_live() {
                return PassReport::Discarded;
            }
            self.audit(AuditEventType::CheckOutFailed {
                session_id: session.id().clone(),
                error: e.to_string(),
            });
            return PassReport::Failed(self.remote_failure(session, e));
        }
        if !session.is_live() {
            return PassReport::Discarded;
        }

        self.update(|s| {
            s.state = next_state(s.state, ReconcileAction::CheckOut);
            s.banner = None;
        });
        self.audit(AuditEventType::CheckedOut {
            session_id: session.id().clone(),
            date: today.to_string(),
            distance_meters: outcome.distance_meters,
        });
        info!(date = today, "Checked out");

        self.refresh_after_transition(session).await;

        PassReport::Completed(outcome)
    }

    async fn refresh_after_transition(&self, session: &Session) {
        if let Err(e) = self.refresh_log(session).await {
            debug!(error = %e, "Log refresh after transition failed");
        }
    }

    /// Log a service error and revoke the session on Unauthorized
    fn remote_failure(&self, session: &Session, error: RemoteError) -> PassError {
        if error.is_unauthorized() {
            if session.revoke() {
                self.audit(AuditEventType::SessionRevoked {
                    session_id: session.id().clone(),
                });
            }
            warn!(session_id = %session.id(), "Token rejected, log in again to resume");
            self.update(|s| s.status = StatusMessage::LoginRequired);
        } else {
            warn!(error = %error, "Attendance service call failed");
        }
        error.into()
    }
}

fn location_status(error: &LocationError) -> StatusMessage {
    match error {
        LocationError::Unavailable(_) => StatusMessage::GeolocationUnsupported,
        LocationError::Denied(reason) => StatusMessage::LocationError(reason.clone()),
        LocationError::Timeout(_) => StatusMessage::LocationError(error.to_string()),
    }
}
