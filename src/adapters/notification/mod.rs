//! Notification adapters.
//!
//! - `BackgroundNotifier` - bounded queue with a retrying worker
//! - `ResendEmailSender` - email delivery over the Resend API
//! - `RecordingNotifier` - captures notifications in tests

mod background;
mod recording;
mod resend;

pub use background::{BackgroundNotifier, NotificationStats, NotificationWorkerConfig};
pub use recording::RecordingNotifier;
pub use resend::{ResendConfig, ResendEmailSender};
