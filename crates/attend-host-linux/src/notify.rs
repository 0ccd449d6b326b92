//! Desktop notifications through a `notify-send` compatible command

use async_trait::async_trait;
use attend_config::NotificationConfig;
use attend_host_api::{NotificationPermission, NotificationSink, NotifyError, NotifyResult};
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;
use tracing::{debug, info};

/// Notification sink backed by an external command invoked as
/// `<command> <title> <body>`.
///
/// Permission starts undetermined; requesting it probes whether the command
/// can run at all. A disabled configuration denies outright.
pub struct CommandNotificationSink {
    command: String,
    permission: Mutex<NotificationPermission>,
}

impl CommandNotificationSink {
    pub fn new(config: &NotificationConfig) -> Self {
        let permission = if config.enabled {
            NotificationPermission::Undetermined
        } else {
            NotificationPermission::Denied
        };

        Self {
            command: config.command.clone(),
            permission: Mutex::new(permission),
        }
    }

    fn set_permission(&self, permission: NotificationPermission) {
        *self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = permission;
    }
}

#[async_trait]
impl NotificationSink for CommandNotificationSink {
    fn permission(&self) -> NotificationPermission {
        *self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn request_permission(&self) -> NotificationPermission {
        if self.permission() != NotificationPermission::Undetermined {
            return self.permission();
        }

        let runnable = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);

        let permission = if runnable {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        };
        info!(command = %self.command, ?permission, "Notification permission resolved");
        self.set_permission(permission);
        permission
    }

    async fn show(&self, title: &str, body: &str) -> NotifyResult<()> {
        if self.permission() != NotificationPermission::Granted {
            return Err(NotifyError::PermissionDenied);
        }

        let output = Command::new(&self.command)
            .arg(title)
            .arg(body)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(NotifyError::Backend(format!(
                "{} exited with {}: {}",
                self.command, output.status, stderr
            )));
        }

        debug!(title, "Notification shown");
        Ok(())
    }
}
