//! Payment provider port for hosted checkout and subscription changes.
//!
//! The provider owns money movement. This crate only asks it for hosted
//! checkout pages and for subscription changes requested by the user; the
//! resulting state comes back through webhooks.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any hosted-checkout provider
//! - **Metadata echo**: Checkout metadata is returned verbatim on webhook events

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::EventMetadata;

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session.
    ///
    /// Returns a URL for the customer to complete payment.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Apply a change to an existing provider subscription.
    async fn update_subscription(
        &self,
        subscription_id: &str,
        update: SubscriptionUpdate,
    ) -> Result<ProviderSubscription, PaymentError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Provider product being purchased.
    pub product_id: String,

    /// Customer email for pre-fill.
    pub customer_email: Option<String>,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// Echoed back on every webhook event for this checkout.
    pub metadata: EventMetadata,

    /// Provider discount to pre-apply.
    pub discount_id: Option<String>,
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for customer to complete checkout.
    pub url: String,
}

/// Change requested on a provider subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionUpdate {
    /// Set or clear cancellation at the end of the current period.
    CancelAtPeriodEnd(bool),

    /// Switch the subscription to another product.
    ChangeProduct { product_id: String },
}

/// Subscription as reported by the provider after an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub product_id: Option<String>,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    NotFound,
    RateLimited,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimited
                | PaymentErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimited => "rate_limited",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
