//! BackgroundNotifier - Bounded queue for best-effort notification delivery.
//!
//! Handlers hand notifications to `Notifier::notify`, which never blocks and
//! never fails. A single worker task drains the queue and delivers through a
//! `NotificationSender`, retrying a few times before giving up.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `capacity` | 256 | Queued notifications before new ones are dropped |
//! | `max_attempts` | 3 | Delivery attempts per notification |
//! | `retry_backoff` | 500ms | Delay before attempt n is `n * retry_backoff` |
//!
//! ## Observability
//!
//! Final failures and queue-full drops are logged at `warn` and counted in
//! `NotificationStats`.
//!
//! ## Graceful Shutdown
//!
//! On shutdown the worker stops accepting new notifications, delivers what is
//! already queued, then exits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::notification::Notification;
use crate::ports::{NotificationSender, Notifier};

/// Configuration for the notification worker.
#[derive(Debug, Clone)]
pub struct NotificationWorkerConfig {
    pub capacity: usize,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for NotificationWorkerConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Delivery counters snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationStats {
    pub sent: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

/// `Notifier` backed by a bounded channel and a background worker.
#[derive(Clone)]
pub struct BackgroundNotifier {
    tx: mpsc::Sender<Notification>,
    counters: Arc<Counters>,
}

impl BackgroundNotifier {
    /// Spawns the worker on the current runtime.
    pub fn spawn(
        sender: Arc<dyn NotificationSender>,
        config: NotificationWorkerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let counters = Arc::new(Counters::default());

        let worker = NotificationWorker {
            rx,
            sender,
            counters: counters.clone(),
            config,
        };
        let handle = tokio::spawn(worker.run(shutdown));

        (Self { tx, counters }, handle)
    }

    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Notifier for BackgroundNotifier {
    fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(kind = n.kind(), "Notification queue full, dropping notification");
            }
            Err(TrySendError::Closed(n)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(kind = n.kind(), "Notification worker stopped, dropping notification");
            }
        }
    }
}

struct NotificationWorker {
    rx: mpsc::Receiver<Notification>,
    sender: Arc<dyn NotificationSender>,
    counters: Arc<Counters>,
    config: NotificationWorkerConfig,
}

impl NotificationWorker {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.drain().await;
                        return;
                    }
                }

                next = self.rx.recv() => match next {
                    Some(notification) => self.deliver(notification).await,
                    None => return,
                },
            }
        }
    }

    async fn drain(&mut self) {
        self.rx.close();
        while let Some(notification) = self.rx.recv().await {
            self.deliver(notification).await;
        }
        tracing::debug!("Notification worker drained and stopped");
    }

    async fn deliver(&self, notification: Notification) {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.sender.send(&notification).await {
                Ok(()) => {
                    self.counters.sent.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(kind = notification.kind(), attempt, "Notification delivered");
                    return;
                }
                Err(e) if attempt < max_attempts => {
                    tracing::debug!(
                        kind = notification.kind(),
                        attempt,
                        error = %e,
                        "Notification delivery failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        kind = notification.kind(),
                        attempts = max_attempts,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }
    }
}
