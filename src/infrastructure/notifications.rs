use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

/// User-facing message channel. Store failures end here instead of
/// propagating into the grid or the buckets.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationSink {
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock_notifications())
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock_notifications().clone()
    }

    /// A panic while the list was held leaves it intact, so the poison is
    /// logged and the list is used as is.
    fn lock_notifications(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.notifications.lock().unwrap_or_else(|poisoned| {
            tracing::error!("notification list lock poisoned; recovering queued notifications");
            poisoned.into_inner()
        })
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, notification: Notification) {
        tracing::debug!(kind = ?notification.kind, message = %notification.message, "notification");
        self.lock_notifications().push(notification);
    }
}
