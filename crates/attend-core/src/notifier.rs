//! Permission-gated user notifications

use attend_host_api::{NotificationPermission, NotificationSink};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// What happened to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Shown,
    /// Permission denied or not granted when asked
    NotPermitted,
    /// The platform failed to display it
    Failed,
}

/// Shows notifications, asking for permission at most once
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    requested: AtomicBool,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            requested: AtomicBool::new(false),
        }
    }

    pub async fn notify(&self, title: &str, body: &str) -> NotifyOutcome {
        let permission = match self.sink.permission() {
            NotificationPermission::Undetermined if !self.requested.swap(true, Ordering::SeqCst) => {
                self.sink.request_permission().await
            }
            other => other,
        };

        if permission != NotificationPermission::Granted {
            debug!(?permission, title, "Notification not permitted");
            return NotifyOutcome::NotPermitted;
        }

        match self.sink.show(title, body).await {
            Ok(()) => NotifyOutcome::Shown,
            Err(e) => {
                debug!(error = %e, title, "Notification display failed");
                NotifyOutcome::Failed
            }
        }
    }
}
