//! BillingEventDispatcher - Routes verified provider events to their handler.

use std::sync::Arc;

use async_trait::async_trait;

use super::payment_ledger::PaymentLedgerHandler;
use super::subscription_lifecycle::SubscriptionLifecycleHandler;
use crate::domain::billing::{ProviderEvent, VerifiedEvent, WebhookDispatcher, WebhookError};

/// Dispatches each known event type to the subscription lifecycle or the
/// payment ledger. Unknown types are acknowledged as ignored.
pub struct BillingEventDispatcher {
    subscriptions: Arc<SubscriptionLifecycleHandler>,
    ledger: Arc<PaymentLedgerHandler>,
}

impl BillingEventDispatcher {
    pub fn new(
        subscriptions: Arc<SubscriptionLifecycleHandler>,
        ledger: Arc<PaymentLedgerHandler>,
    ) -> Self {
        Self {
            subscriptions,
            ledger,
        }
    }
}

#[async_trait]
impl WebhookDispatcher for BillingEventDispatcher {
    async fn dispatch(&self, event: &VerifiedEvent) -> Result<(), WebhookError> {
        tracing::debug!(
            delivery_id = %event.delivery_id,
            event_type = %event.event_type,
            "Dispatching webhook event"
        );

        match &event.event {
            ProviderEvent::CheckoutCreated(checkout) => {
                self.ledger.handle_checkout_created(checkout, &event.data).await?;
            }
            ProviderEvent::CheckoutUpdated(checkout) => {
                self.ledger.handle_checkout_updated(checkout, &event.data).await?;
            }
            ProviderEvent::OrderCreated(order) => {
                self.ledger.handle_order_created(order, &event.data).await?;
            }
            ProviderEvent::SubscriptionCreated(sub) => {
                self.subscriptions.handle_created(sub).await?;
            }
            ProviderEvent::SubscriptionUpdated(sub) => {
                self.subscriptions.handle_updated(sub).await?;
            }
            ProviderEvent::SubscriptionActive(sub) => {
                self.subscriptions.handle_active(sub).await?;
            }
            ProviderEvent::SubscriptionCanceled(sub) => {
                self.subscriptions.handle_canceled(sub).await?;
            }
            ProviderEvent::SubscriptionRevoked(sub) => {
                self.subscriptions.handle_revoked(sub).await?;
            }
            ProviderEvent::Unknown { event_type, .. } => {
                tracing::info!(event_type = %event_type, "Ignoring unhandled webhook event type");
                return Err(WebhookError::Ignored(format!(
                    "Unhandled event type: {}",
                    event_type
                )));
            }
        }

        Ok(())
    }
}
