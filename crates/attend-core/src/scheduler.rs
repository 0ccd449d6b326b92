//! Periodic pass scheduling tied to a session

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::{AttendanceEngine, Session, SessionState};

/// Default time between passes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Handle to a running scheduler
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop ticking and wait for the timer task to exit.
    ///
    /// A pass already running is left to finish; it drops its results once
    /// the session has ended.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            debug!(error = %e, "Scheduler task did not exit cleanly");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Drives an engine for the lifetime of one session
pub struct Scheduler;

impl Scheduler {
    /// Refresh the log and run a pass now, then run a pass every `period`
    /// until stopped or until the session ends.
    pub fn start(
        engine: Arc<AttendanceEngine>,
        session: Arc<Session>,
        period: Duration,
    ) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut session_rx = session.subscribe();
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut first = true;

            info!(
                session_id = %session.id(),
                period_secs = period.as_secs(),
                "Scheduler started"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if !session.is_live() {
                            break;
                        }
                        // Each pass runs on its own task so a slow pass meets
                        // the in-flight guard instead of delaying the timer
                        let engine = engine.clone();
                        let session = session.clone();
                        let refresh_first = std::mem::take(&mut first);
                        tokio::spawn(async move {
                            if refresh_first {
                                if let Err(e) = engine.refresh_log(&session).await {
                                    debug!(error = %e, "Initial log refresh failed");
                                }
                            }
                            let report = engine.run_pass(&session).await;
                            debug!(?report, "Pass finished");
                        });
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!("Scheduler shutting down");
                            break;
                        }
                    }
                    changed = session_rx.changed() => {
                        if changed.is_err() || *session_rx.borrow() == SessionState::Ended {
                            debug!("Session ended, scheduler stopping");
                            break;
                        }
                    }
                }
            }

            info!(session_id = %session.id(), "Scheduler stopped");
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocationSampler, Notifier};
    use attend_api::OfficeLocation;
    use attend_host_api::{MockLocationProvider, MockNotificationSink};
    use attend_remote::MockAttendanceApi;
    use attend_store::SqliteStore;
    use attend_util::SessionToken;

    fn token() -> SessionToken {
        SessionToken::new("employee-token").unwrap()
    }

    fn setup() -> (
        Arc<AttendanceEngine>,
        Arc<MockLocationProvider>,
        Arc<MockAttendanceApi>,
    ) {
        let provider = Arc::new(MockLocationProvider::at(11.6446, 78.1223));
        let api = Arc::new(MockAttendanceApi::new(token()));
        let engine = Arc::new(AttendanceEngine::new(
            OfficeLocation::new(11.6446, 78.1223, 100.0),
            LocationSampler::new(provider.clone(), Duration::from_secs(10)),
            api.clone(),
            Notifier::new(Arc::new(MockNotificationSink::granted())),
            Arc::new(SqliteStore::in_memory().unwrap()),
        ));
        (engine, provider, api)
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_period() {
        let (engine, provider, _api) = setup();
        let session = Arc::new(Session::new(Some(token())));

        let handle = Scheduler::start(engine, session, DEFAULT_POLL_INTERVAL);

        advance(1).await;
        assert_eq!(provider.query_count(), 1);

        advance(30).await;
        assert_eq!(provider.query_count(), 2);

        advance(60).await;
        assert_eq!(provider.query_count(), 4);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let (engine, provider, _api) = setup();
        let session = Arc::new(Session::new(Some(token())));

        let handle = Scheduler::start(engine, session, DEFAULT_POLL_INTERVAL);
        advance(1).await;
        handle.stop().await;

        advance(120).await;
        assert_eq!(provider.query_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn session_end_stops_scheduler() {
        let (engine, provider, _api) = setup();
        let session = Arc::new(Session::new(Some(token())));

        let handle = Scheduler::start(engine, session.clone(), DEFAULT_POLL_INTERVAL);
        advance(1).await;
        session.end();
        advance(1).await;

        assert!(handle.is_finished());
        advance(120).await;
        assert_eq!(provider.query_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_pass_suppresses_overlapping_ticks() {
        let (engine, _provider, api) = setup();
        // List and check-in each take 40s, so the 30s and 60s ticks overlap the first pass
        api.set_delay(Some(Duration::from_secs(40)));
        let session = Arc::new(Session::new(Some(token())));

        let handle = Scheduler::start(engine.clone(), session, DEFAULT_POLL_INTERVAL);
        advance(200).await;

        assert_eq!(api.check_in_count(), 1);
        assert_eq!(api.records().len(), 1);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn tokenless_session_keeps_ticking_without_calls() {
        let (engine, provider, api) = setup();
        let session = Arc::new(Session::new(None));

        let handle = Scheduler::start(engine.clone(), session, DEFAULT_POLL_INTERVAL);
        advance(95).await;

        assert_eq!(provider.query_count(), 0);
        assert_eq!(api.list_count(), 0);
        assert_eq!(
            engine.snapshot().status,
            attend_api::StatusMessage::LoginRequired
        );
        handle.stop().await;
    }
}
