//! HandleWebhookHandler - Entry point for inbound payment provider webhooks.
//!
//! Verifies the signature over the raw body, then hands the typed event to
//! the idempotent processor. Nothing is written when verification fails.

use std::sync::Arc;

use crate::domain::billing::{
    IdempotentWebhookProcessor, SignatureHeaders, WebhookError, WebhookVerifier,
};
use crate::ports::WebhookResult;

/// Command carrying one webhook delivery exactly as received.
#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    pub headers: SignatureHeaders,
    pub body: Vec<u8>,
}

/// Handler for inbound webhook deliveries.
pub struct HandleWebhookHandler {
    verifier: Arc<WebhookVerifier>,
    processor: Arc<IdempotentWebhookProcessor>,
}

impl HandleWebhookHandler {
    pub fn new(verifier: Arc<WebhookVerifier>, processor: Arc<IdempotentWebhookProcessor>) -> Self {
        Self {
            verifier,
            processor,
        }
    }

    pub async fn handle(&self, cmd: HandleWebhookCommand) -> Result<WebhookResult, WebhookError> {
        let event = self.verifier.verify(&cmd.headers, &cmd.body).map_err(|e| {
            if e.is_signature_failure() {
                tracing::warn!(error = %e, "Webhook signature verification failed");
            } else {
                tracing::warn!(error = %e, "Webhook payload could not be decoded");
            }
            e
        })?;

        let result = self.processor.process(&event).await;

        match &result {
            Ok(WebhookResult::AlreadyProcessed) => tracing::info!(
                delivery_id = %event.delivery_id,
                event_type = %event.event_type,
                "Duplicate webhook delivery acknowledged"
            ),
            Ok(outcome) => tracing::debug!(
                delivery_id = %event.delivery_id,
                event_type = %event.event_type,
                outcome = ?outcome,
                "Webhook processed"
            ),
            Err(e) if e.is_retryable() => tracing::error!(
                delivery_id = %event.delivery_id,
                event_type = %event.event_type,
                error = %e,
                "Webhook processing failed"
            ),
            Err(e) => tracing::warn!(
                delivery_id = %event.delivery_id,
                event_type = %event.event_type,
                error = %e,
                "Webhook rejected"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEntitlementStore, InMemoryWebhookEventRepository};
    use crate::adapters::notification::RecordingNotifier;
    use crate::application::handlers::billing::{
        BillingEventDispatcher, PaymentLedgerHandler, SubscriptionLifecycleHandler,
    };
    use crate::domain::account::User;
    use crate::ports::UserRepository;
    use serde_json::json;

    const SECRET: &str = "whsec_dGVzdC1zZWNyZXQtYnl0ZXM=";

    struct Fixture {
        store: Arc<InMemoryEntitlementStore>,
        handler: HandleWebhookHandler,
        verifier: Arc<WebhookVerifier>,
        user: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let user = User::register("ext-1", "ada@example.com", "Ada", None);
        store.insert_user(&user).await.unwrap();

        let dispatcher = Arc::new(BillingEventDispatcher::new(
            Arc::new(SubscriptionLifecycleHandler::new(
                store.clone(),
                store.clone(),
                notifier.clone(),
            )),
            Arc::new(PaymentLedgerHandler::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                notifier,
            )),
        ));
        let processor = Arc::new(IdempotentWebhookProcessor::new(
            Arc::new(InMemoryWebhookEventRepository::new()),
            dispatcher,
        ));
        let verifier = Arc::new(WebhookVerifier::new(SECRET));

        Fixture {
            store,
            handler: HandleWebhookHandler::new(verifier.clone(), processor),
            verifier,
            user,
        }
    }

    fn signed(verifier: &WebhookVerifier, id: &str, body: &[u8]) -> HandleWebhookCommand {
        let ts = chrono::Utc::now().timestamp();
        HandleWebhookCommand {
            headers: SignatureHeaders {
                id: Some(id.to_string()),
                timestamp: Some(ts.to_string()),
                signature: Some(verifier.sign(id, ts, body).unwrap()),
            },
            body: body.to_vec(),
        }
    }

    fn subscription_created(user: &User) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "type": "subscription.created",
            "data": {
                "id": "sub_1",
                "status": "active",
                "metadata": {"userId": user.id.to_string(), "planId": "pro"}
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn valid_delivery_is_processed() {
        let f = fixture().await;
        let body = subscription_created(&f.user);

        let result = f.handler.handle(signed(&f.verifier, "msg_1", &body)).await.unwrap();

        assert_eq!(result, WebhookResult::Processed);
        assert_eq!(f.store.subscriptions().await.len(), 1);
    }

    #[tokio::test]
    async fn redelivery_runs_handlers_once() {
        let f = fixture().await;
        let body = subscription_created(&f.user);

        f.handler.handle(signed(&f.verifier, "msg_1", &body)).await.unwrap();
        let writes = f.store.write_count();
        let second = f.handler.handle(signed(&f.verifier, "msg_1", &body)).await.unwrap();

        assert_eq!(second, WebhookResult::AlreadyProcessed);
        assert_eq!(f.store.write_count(), writes);
    }

    #[tokio::test]
    async fn tampered_body_writes_nothing() {
        let f = fixture().await;
        let body = subscription_created(&f.user);
        let mut cmd = signed(&f.verifier, "msg_1", &body);
        cmd.body = body.iter().map(|b| if *b == b'1' { b'2' } else { *b }).collect();
        let writes = f.store.write_count();

        let result = f.handler.handle(cmd).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        assert_eq!(f.store.write_count(), writes);
    }
}
