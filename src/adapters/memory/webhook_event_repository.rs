//! In-memory webhook delivery log.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository};

/// In-memory implementation of `WebhookEventRepository`.
#[derive(Default)]
pub struct InMemoryWebhookEventRepository {
    records: RwLock<HashMap<String, WebhookEventRecord>>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.event_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        records.insert(record.event_id.clone(), record);
        Ok(SaveResult::Inserted)
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.processed_at >= timestamp);
        Ok((before - records.len()) as u64)
    }
}
