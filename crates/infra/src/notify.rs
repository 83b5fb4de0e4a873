//! Notification sender implementations.
//!
//! The push gateway itself is an external service; these adapters either log
//! the dispatch (dev) or record it (tests). Both are fire-and-forget: nothing
//! here can fail the calling operation.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use mesa_orders::{Notifier, Severity};

/// Logs every notification through `tracing` (dev wiring, and the fallback
/// when no push gateway is configured).
#[derive(Debug, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify_admins(&self, title: &str, body: &str, severity: Severity) {
        info!(severity = severity.as_str(), title, body, "admin notification");
    }

    async fn notify_user(&self, push_token: &str, title: &str, body: &str) {
        info!(push_token, title, body, "user notification");
    }
}

/// A recorded admin notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminNotification {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

/// A recorded user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotification {
    pub push_token: String,
    pub title: String,
    pub body: String,
}

/// Records notifications for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    admin: Mutex<Vec<AdminNotification>>,
    user: Mutex<Vec<UserNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin_notifications(&self) -> Vec<AdminNotification> {
        self.admin.lock().unwrap().clone()
    }

    pub fn user_notifications(&self) -> Vec<UserNotification> {
        self.user.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_admins(&self, title: &str, body: &str, severity: Severity) {
        self.admin.lock().unwrap().push(AdminNotification {
            title: title.to_string(),
            body: body.to_string(),
            severity,
        });
    }

    async fn notify_user(&self, push_token: &str, title: &str, body: &str) {
        self.user.lock().unwrap().push(UserNotification {
            push_token: push_token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}
