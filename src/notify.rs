//! Completion notification over a chat webhook.
//!
//! The message is posted as `{"content": "..."}` on a background thread.
//! Failures are logged and never propagate; callers only [`wait`] for the
//! thread before exiting.
//!
//! [`wait`]: NotificationHandle::wait

use std::thread::{self, JoinHandle};
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, error, info};

use crate::config::NotifyConfig;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned {0}")]
    Status(StatusCode),
}

/// Posts messages to a webhook, if one is configured.
#[derive(Debug, Clone)]
pub struct Notifier {
    url: Option<String>,
    env_var: String,
    timeout: Duration,
}

impl Notifier {
    /// Read the webhook URL from the environment variable named in `config`.
    pub fn from_env(config: &NotifyConfig) -> Self {
        let url = std::env::var(&config.env_var)
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self {
            url,
            env_var: config.env_var.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn new(url: Option<String>, timeout: Duration) -> Self {
        Self {
            url,
            env_var: String::new(),
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Send `message` in the background.
    pub fn send(&self, message: impl Into<String>) -> NotificationHandle {
        let Some(url) = self.url.clone() else {
            info!("{} is not set; skipping notification", self.env_var);
            return NotificationHandle(None);
        };
        let message = message.into();
        let timeout = self.timeout;

        let spawned = thread::Builder::new()
            .name("gaussparse-notify".to_string())
            .spawn(move || match post(&url, &message, timeout) {
                Ok(()) => debug!("Notification delivered"),
                Err(e) => error!("Failed to send notification: {}", e),
            });
        match spawned {
            Ok(handle) => NotificationHandle(Some(handle)),
            Err(e) => {
                error!("Failed to start notification thread: {}", e);
                NotificationHandle(None)
            }
        }
    }
}

/// Join handle for an in-flight notification.
#[must_use = "call wait() before exiting or the notification may be lost"]
pub struct NotificationHandle(Option<JoinHandle<()>>);

impl NotificationHandle {
    /// Block until the notification finished (or was skipped).
    pub fn wait(self) {
        if let Some(handle) = self.0 {
            if handle.join().is_err() {
                error!("Notification thread panicked");
            }
        }
    }
}

/// Post one message synchronously.
pub fn post(url: &str, message: &str, timeout: Duration) -> Result<(), NotifyError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let response = client
        .post(url)
        .json(&json!({ "content": message }))
        .send()?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(NotifyError::Status(status))
    }
}
