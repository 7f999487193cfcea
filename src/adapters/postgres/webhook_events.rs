//! PostgreSQL webhook delivery log.
//!
//! `event_id` is the primary key; a concurrent duplicate insert resolves to
//! `SaveResult::AlreadyExists` through `ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::store::{corrupt, read_error, write_error};
use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome};

/// PostgreSQL implementation of `WebhookEventRepository`.
#[derive(Clone)]
pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    processed_at: DateTime<Utc>,
    outcome: String,
    note: Option<String>,
    payload: serde_json::Value,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let outcome =
            WebhookOutcome::parse(&row.outcome).ok_or_else(|| corrupt("outcome", &row.outcome))?;

        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            processed_at: row.processed_at,
            outcome,
            note: row.note,
            payload: row.payload,
        })
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, processed_at, outcome, note, payload
            FROM webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch webhook event", e))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type, processed_at, outcome, note, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.processed_at)
        .bind(record.outcome.as_str())
        .bind(&record.note)
        .bind(&record.payload)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to record webhook event", e))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM webhook_events WHERE processed_at < $1")
            .bind(timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("Failed to purge webhook events", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_converts_to_record() {
        let row = WebhookEventRow {
            event_id: "msg_1".to_string(),
            event_type: "order.created".to_string(),
            processed_at: Utc::now(),
            outcome: "ignored".to_string(),
            note: Some("unhandled type".to_string()),
            payload: json!({}),
        };

        let record = WebhookEventRecord::try_from(row).unwrap();
        assert_eq!(record.outcome, WebhookOutcome::Ignored);
    }

    #[test]
    fn unknown_outcome_is_rejected() {
        let row = WebhookEventRow {
            event_id: "msg_1".to_string(),
            event_type: "order.created".to_string(),
            processed_at: Utc::now(),
            outcome: "failed".to_string(),
            note: None,
            payload: json!({}),
        };

        assert!(WebhookEventRecord::try_from(row).is_err());
    }
}
