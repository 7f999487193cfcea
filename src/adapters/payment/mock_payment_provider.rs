//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Error injection
//! - Call tracking

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider, ProviderSubscription,
    SubscriptionUpdate,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.fail_with(PaymentError::network("timeout"));
///
/// let result = mock.create_checkout_session(request).await;
/// assert!(result.is_err());
/// assert_eq!(mock.call_count(), 1);
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    checkout_requests: Vec<CreateCheckoutRequest>,
    subscription_updates: Vec<(String, SubscriptionUpdate)>,
    error: Option<PaymentError>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `error`.
    pub fn fail_with(&self, error: PaymentError) {
        self.inner.lock().unwrap().error = Some(error);
    }

    /// Total number of provider calls made.
    pub fn call_count(&self) -> usize {
        let state = self.inner.lock().unwrap();
        state.checkout_requests.len() + state.subscription_updates.len()
    }

    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.inner.lock().unwrap().checkout_requests.clone()
    }

    pub fn subscription_updates(&self) -> Vec<(String, SubscriptionUpdate)> {
        self.inner.lock().unwrap().subscription_updates.clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.inner.lock().unwrap();
        state.checkout_requests.push(request);
        if let Some(error) = state.error.clone() {
            return Err(error);
        }

        let id = format!("chk_mock_{}", state.checkout_requests.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.example.test/{}", id),
            id,
        })
    }

    async fn update_subscription(
        &self,
        subscription_id: &str,
        update: SubscriptionUpdate,
    ) -> Result<ProviderSubscription, PaymentError> {
        let mut state = self.inner.lock().unwrap();
        state
            .subscription_updates
            .push((subscription_id.to_string(), update.clone()));
        if let Some(error) = state.error.clone() {
            return Err(error);
        }

        let (cancel_at_period_end, product_id) = match update {
            SubscriptionUpdate::CancelAtPeriodEnd(cancel) => (cancel, None),
            SubscriptionUpdate::ChangeProduct { product_id } => (false, Some(product_id)),
        };
        Ok(ProviderSubscription {
            id: subscription_id.to_string(),
            status: "active".to_string(),
            cancel_at_period_end,
            product_id,
        })
    }
}
