//! Countdown completion notifications
//!
//! Fired when a pomodoro overlay reaches zero. Notification delivery is
//! best-effort: a missing desktop notifier or a refused permission must never
//! affect the timer itself, so every failure here is logged and swallowed.

use tokio::process::Command;
use tracing::{info, warn};

/// Notification side-effect collaborator
pub trait Notifier: Send + Sync {
    fn notify(&self, summary: &str, body: &str);
}

/// Desktop notifier backed by `notify-send`
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) {
        info!("Notification: {} - {}", summary, body);
        let summary = summary.to_string();
        let body = body.to_string();
        tokio::spawn(async move {
            match Command::new("notify-send")
                .args(["--app-name", "timestack"])
                .arg(&summary)
                .arg(&body)
                .output()
                .await
            {
                Ok(output) if !output.status.success() => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("notify-send failed: {}", stderr);
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to execute notify-send: {}", e),
            }
        });
    }
}

/// Check whether `notify-send` is available. Missing notifications are not
/// fatal; countdowns still complete and clear without them.
pub async fn check_notifier_available() {
    match Command::new("notify-send").arg("--version").output().await {
        Ok(_) => info!("notify-send is available"),
        Err(_) => warn!("notify-send is not available, countdown notifications will be log-only"),
    }
}
