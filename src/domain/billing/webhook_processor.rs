//! Webhook processor - Orchestrates idempotent webhook event handling.
//!
//! ## Design
//!
//! The processor follows these steps:
//! 1. Skip deliveries whose id was already recorded
//! 2. Dispatch to the handler for the event type
//! 3. Record successful and ignored deliveries
//!
//! Failed deliveries are not recorded, so the provider's retry re-runs the
//! handlers. Handlers are idempotent at the row level as well (unique external
//! ids, unique enrollment pair), which covers two copies of a delivery racing
//! past step 1 together.

use async_trait::async_trait;
use std::sync::Arc;

use super::provider_event::VerifiedEvent;
use super::webhook_errors::WebhookError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult};

/// Routes a verified event to the handler for its type.
///
/// Returns `Err(WebhookError::Ignored)` for events that should be
/// acknowledged without side effects.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    async fn dispatch(&self, event: &VerifiedEvent) -> Result<(), WebhookError>;
}

/// Processes webhook events with idempotency guarantees.
pub struct IdempotentWebhookProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl IdempotentWebhookProcessor {
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Process a verified delivery at most once per delivery id.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - handlers ran successfully
    /// - `Ok(WebhookResult::Ignored)` - acknowledged without side effects
    /// - `Ok(WebhookResult::AlreadyProcessed)` - duplicate delivery skipped
    /// - `Err(_)` - processing failed; nothing recorded
    pub async fn process(&self, event: &VerifiedEvent) -> Result<WebhookResult, WebhookError> {
        // 1. Check if already processed
        if self
            .repository
            .find_by_event_id(&event.delivery_id)
            .await?
            .is_some()
        {
            return Ok(WebhookResult::AlreadyProcessed);
        }

        // 2. Dispatch
        let (record, result) = match self.dispatcher.dispatch(event).await {
            Ok(()) => (
                WebhookEventRecord::success(
                    &event.delivery_id,
                    &event.event_type,
                    event.data.clone(),
                ),
                WebhookResult::Processed,
            ),
            Err(WebhookError::Ignored(reason)) => (
                WebhookEventRecord::ignored(
                    &event.delivery_id,
                    &event.event_type,
                    reason,
                    event.data.clone(),
                ),
                WebhookResult::Ignored,
            ),
            Err(e) => return Err(e),
        };

        // 3. Record (a concurrent copy may have won)
        match self.repository.save(record).await? {
            SaveResult::Inserted => Ok(result),
            SaveResult::AlreadyExists => Ok(WebhookResult::AlreadyProcessed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::ProviderEvent;
    use crate::domain::foundation::DomainError;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::RwLock;

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct MockWebhookRepository {
        records: RwLock<HashMap<String, WebhookEventRecord>>,
        always_exists_on_save: bool,
    }

    #[async_trait]
    impl WebhookEventRepository for MockWebhookRepository {
        async fn find_by_event_id(
            &self,
            event_id: &str,
        ) -> Result<Option<WebhookEventRecord>, DomainError> {
            Ok(self.records.read().await.get(event_id).cloned())
        }

        async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
            if self.always_exists_on_save {
                return Ok(SaveResult::AlreadyExists);
            }
            let mut records = self.records.write().await;
            if records.contains_key(&record.event_id) {
                return Ok(SaveResult::AlreadyExists);
            }
            records.insert(record.event_id.clone(), record);
            Ok(SaveResult::Inserted)
        }

        async fn delete_before(&self, _timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    enum Behavior {
        Succeed,
        Ignore,
        Fail,
    }

    struct CountingDispatcher {
        calls: AtomicU32,
        behavior: Behavior,
    }

    impl CountingDispatcher {
        fn new(behavior: Behavior) -> Self {
            Self {
                calls: AtomicU32::new(0),
                behavior,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebhookDispatcher for CountingDispatcher {
        async fn dispatch(&self, _event: &VerifiedEvent) -> Result<(), WebhookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed => Ok(()),
                Behavior::Ignore => Err(WebhookError::Ignored("unhandled".to_string())),
                Behavior::Fail => Err(WebhookError::Database("down".to_string())),
            }
        }
    }

    fn event(delivery_id: &str) -> VerifiedEvent {
        VerifiedEvent {
            delivery_id: delivery_id.to_string(),
            event_type: "benefit.granted".to_string(),
            event: ProviderEvent::Unknown {
                event_type: "benefit.granted".to_string(),
                data: json!({}),
            },
            data: json!({}),
        }
    }

    fn processor(
        repo: Arc<MockWebhookRepository>,
        dispatcher: Arc<CountingDispatcher>,
    ) -> IdempotentWebhookProcessor {
        IdempotentWebhookProcessor::new(repo, dispatcher)
    }

    // ══════════════════════════════════════════════════════════════
    // Processing Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_delivery_is_processed_and_recorded() {
        let repo = Arc::new(MockWebhookRepository::default());
        let dispatcher = Arc::new(CountingDispatcher::new(Behavior::Succeed));
        let processor = processor(repo.clone(), dispatcher.clone());

        let result = processor.process(&event("msg_1")).await.unwrap();

        assert_eq!(result, WebhookResult::Processed);
        assert_eq!(dispatcher.calls(), 1);
        assert!(repo.find_by_event_id("msg_1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn redelivery_skips_dispatch() {
        let repo = Arc::new(MockWebhookRepository::default());
        let dispatcher = Arc::new(CountingDispatcher::new(Behavior::Succeed));
        let processor = processor(repo, dispatcher.clone());

        processor.process(&event("msg_1")).await.unwrap();
        let second = processor.process(&event("msg_1")).await.unwrap();

        assert_eq!(second, WebhookResult::AlreadyProcessed);
        assert_eq!(dispatcher.calls(), 1);
    }

    #[tokio::test]
    async fn ignored_delivery_is_acknowledged_and_recorded() {
        let repo = Arc::new(MockWebhookRepository::default());
        let dispatcher = Arc::new(CountingDispatcher::new(Behavior::Ignore));
        let processor = processor(repo.clone(), dispatcher);

        let result = processor.process(&event("msg_1")).await.unwrap();

        assert_eq!(result, WebhookResult::Ignored);
        let record = repo.find_by_event_id("msg_1").await.unwrap().unwrap();
        assert_eq!(record.note.as_deref(), Some("unhandled"));
    }

    #[tokio::test]
    async fn failed_delivery_is_not_recorded_so_retry_reprocesses() {
        let repo = Arc::new(MockWebhookRepository::default());
        let dispatcher = Arc::new(CountingDispatcher::new(Behavior::Fail));
        let processor = processor(repo.clone(), dispatcher.clone());

        assert!(processor.process(&event("msg_1")).await.is_err());
        assert!(repo.find_by_event_id("msg_1").await.unwrap().is_none());

        assert!(processor.process(&event("msg_1")).await.is_err());
        assert_eq!(dispatcher.calls(), 2);
    }

    #[tokio::test]
    async fn losing_the_save_race_reports_already_processed() {
        let repo = Arc::new(MockWebhookRepository {
            always_exists_on_save: true,
            ..Default::default()
        });
        let dispatcher = Arc::new(CountingDispatcher::new(Behavior::Succeed));
        let processor = processor(repo, dispatcher);

        let result = processor.process(&event("msg_1")).await.unwrap();

        assert_eq!(result, WebhookResult::AlreadyProcessed);
    }
}
