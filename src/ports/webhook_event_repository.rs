//! WebhookEventRepository port - Tracks processed webhook deliveries.
//!
//! The payment provider delivers webhooks at least once. A delivery keeps the
//! same `webhook-id` across retries, so recording that id after a successful
//! dispatch lets the processor acknowledge redeliveries without re-running
//! handlers.
//!
//! Only successful or intentionally ignored deliveries are recorded. A failed
//! delivery leaves no record so the provider's retry runs the handlers again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// Outcome stored for a processed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Success,
    Ignored,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Success => "success",
            WebhookOutcome::Ignored => "ignored",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(WebhookOutcome::Success),
            "ignored" => Some(WebhookOutcome::Ignored),
            _ => None,
        }
    }
}

/// Record of a processed webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Delivery id from the `webhook-id` header.
    pub event_id: String,

    /// Wire event type, e.g. `subscription.updated`.
    pub event_type: String,

    pub processed_at: DateTime<Utc>,

    pub outcome: WebhookOutcome,

    /// Reason an event was ignored.
    pub note: Option<String>,

    /// Event data for debugging.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    /// Creates a new success record.
    pub fn success(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            outcome: WebhookOutcome::Success,
            note: None,
            payload,
        }
    }

    /// Creates a new ignored record.
    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            outcome: WebhookOutcome::Ignored,
            note: Some(reason.into()),
            payload,
        }
    }
}

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this delivery).
    Inserted,
    /// Record already exists (duplicate delivery).
    AlreadyExists,
}

/// Port for storing and retrieving processed webhook deliveries.
///
/// Implementations should use a PRIMARY KEY on `event_id` so concurrent
/// deliveries of the same id cannot both be recorded.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Find a previously processed delivery.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Attempt to save a delivery record with insert-if-absent semantics.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Delete records processed before the given time. Returns the count.
    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError>;
}

/// Result of webhook processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResult {
    /// Handlers ran and succeeded.
    Processed,
    /// Acknowledged without side effects (unknown type or nothing to do).
    Ignored,
    /// Delivery id seen before; handlers skipped.
    AlreadyProcessed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_record_has_no_note() {
        let record = WebhookEventRecord::success("msg_1", "order.created", json!({}));
        assert_eq!(record.outcome, WebhookOutcome::Success);
        assert!(record.note.is_none());
    }

    #[test]
    fn ignored_record_keeps_reason() {
        let record =
            WebhookEventRecord::ignored("msg_1", "benefit.granted", "unhandled type", json!({}));
        assert_eq!(record.outcome, WebhookOutcome::Ignored);
        assert_eq!(record.note.as_deref(), Some("unhandled type"));
    }

    #[test]
    fn outcome_round_trips_through_storage_form() {
        for outcome in [WebhookOutcome::Success, WebhookOutcome::Ignored] {
            assert_eq!(WebhookOutcome::parse(outcome.as_str()), Some(outcome));
        }
        assert_eq!(WebhookOutcome::parse("failed"), None);
    }
}
