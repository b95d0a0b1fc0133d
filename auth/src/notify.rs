//! Outcome notifications emitted by session operations
//!
//! Each register/login/logout call emits exactly one `Notification`. The
//! presentation layer renders them as transient toasts; the core only hands
//! them to a `Notifier`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default time a toast stays on screen
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

/// User-facing outcome message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub detail: String,
    pub severity: Severity,
    pub display_duration_ms: u64,
}

impl Notification {
    pub fn info(title: impl Into<String>, detail: impl Into<String>, duration: Duration) -> Self {
        Self::new(title, detail, Severity::Info, duration)
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>, duration: Duration) -> Self {
        Self::new(title, detail, Severity::Error, duration)
    }

    fn new(
        title: impl Into<String>,
        detail: impl Into<String>,
        severity: Severity,
        duration: Duration,
    ) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            severity,
            display_duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Sink for outcome notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => info!("{}: {}", notification.title, notification.detail),
            Severity::Error => warn!("{}: {}", notification.title, notification.detail),
        }
    }
}

/// Buffers notifications until the presentation layer drains them.
///
/// Clones share the same buffer, so one handle can be given to the session
/// manager while another is kept for draining.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending notification, oldest first
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        self.lock().push_back(notification);
    }
}
