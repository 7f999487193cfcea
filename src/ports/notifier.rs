//! Notification ports.
//!
//! - `NotificationSender` delivers one message (email API, SMTP, ...).
//! - `Notifier` is what handlers call. It must return immediately; delivery
//!   happens in the background and its failures never reach the caller.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::notification::Notification;

/// Delivers a single notification.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), DomainError>;
}

/// Fire-and-forget notification hand-off.
pub trait Notifier: Send + Sync {
    /// Queue a notification for background delivery.
    fn notify(&self, notification: Notification);
}
