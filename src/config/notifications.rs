//! Notification queue configuration

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::notification::NotificationWorkerConfig;

/// Background notification queue settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Queued notifications before new ones are dropped
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Delivery attempts per notification
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl NotificationsConfig {
    pub fn worker_config(&self) -> NotificationWorkerConfig {
        NotificationWorkerConfig {
            capacity: self.capacity,
            max_attempts: self.max_attempts,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.capacity == 0 || self.max_attempts == 0 {
            return Err(ValidationError::InvalidNotificationQueue);
        }
        Ok(())
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_capacity() -> usize {
    256
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    500
}
