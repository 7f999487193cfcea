//! HTTP payment provider adapter.
//!
//! Implements `PaymentProvider` against the provider's JSON REST API using a
//! bearer access token.
//!
//! # Configuration
//!
//! ```ignore
//! let config = PaymentApiConfig::new("https://api.provider.example", access_token);
//! let adapter = HttpPaymentProvider::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::billing::EventMetadata;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    ProviderSubscription, SubscriptionUpdate,
};

/// Payment provider API configuration.
#[derive(Clone)]
pub struct PaymentApiConfig {
    access_token: SecretString,
    api_base_url: String,
}

impl PaymentApiConfig {
    pub fn new(api_base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckoutBody<'a> {
    products: [&'a str; 1],
    success_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount_id: Option<&'a str>,
    metadata: &'a EventMetadata,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum SubscriptionPatch<'a> {
    Cancel { cancel_at_period_end: bool },
    Product { product_id: &'a str },
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Payment provider over HTTP.
pub struct HttpPaymentProvider {
    config: PaymentApiConfig,
    http_client: reqwest::Client,
}

impl HttpPaymentProvider {
    pub fn new(config: PaymentApiConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Map a non-success response to a `PaymentError`.
    async fn error_from(response: reqwest::Response, operation: &str) -> PaymentError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, error = %text, operation, "Payment provider request failed");

        let parsed: Option<ErrorResponse> = serde_json::from_str(&text).ok();
        let provider_code = parsed.as_ref().and_then(|e| e.error.clone());
        let message = parsed
            .and_then(|e| e.detail)
            .map(|d| d.to_string())
            .unwrap_or(text);

        let code = match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                PaymentErrorCode::AuthenticationError
            }
            reqwest::StatusCode::NOT_FOUND => PaymentErrorCode::NotFound,
            reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimited,
            s if s.is_client_error() => PaymentErrorCode::InvalidRequest,
            _ => PaymentErrorCode::ProviderError,
        };

        let error = PaymentError::new(code, format!("{} failed: {}", operation, message));
        match provider_code {
            Some(c) => error.with_provider_code(c),
            None => error,
        }
    }
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkouts/", self.config.api_base_url);
        let body = CheckoutBody {
            products: [&request.product_id],
            success_url: &request.success_url,
            customer_email: request.customer_email.as_deref(),
            discount_id: request.discount_id.as_deref(),
            metadata: &request.metadata,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "create_checkout").await);
        }

        let checkout: CheckoutResponse = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse checkout response: {}", e))
        })?;

        tracing::debug!(checkout_id = %checkout.id, "Checkout session created");

        Ok(CheckoutSession {
            id: checkout.id,
            url: checkout.url,
        })
    }

    async fn update_subscription(
        &self,
        subscription_id: &str,
        update: SubscriptionUpdate,
    ) -> Result<ProviderSubscription, PaymentError> {
        let url = format!(
            "{}/v1/subscriptions/{}",
            self.config.api_base_url, subscription_id
        );
        let patch = match &update {
            SubscriptionUpdate::CancelAtPeriodEnd(cancel) => SubscriptionPatch::Cancel {
                cancel_at_period_end: *cancel,
            },
            SubscriptionUpdate::ChangeProduct { product_id } => {
                SubscriptionPatch::Product { product_id }
            }
        };

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&patch)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, "update_subscription").await);
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse subscription response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_body_serializes_metadata_and_skips_missing_options() {
        let metadata = EventMetadata::course_purchase(
            "user-1".to_string(),
            "course-1".to_string(),
            "rust-101".to_string(),
        );
        let body = CheckoutBody {
            products: ["prod_1"],
            success_url: "https://example.com/thanks",
            customer_email: None,
            discount_id: Some("disc_1"),
            metadata: &metadata,
        };

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["products"][0], "prod_1");
        assert_eq!(json["discount_id"], "disc_1");
        assert!(json.get("customer_email").is_none());
        assert_eq!(json["metadata"]["type"], "course_purchase");
        assert_eq!(json["metadata"]["courseSlug"], "rust-101");
    }

    #[test]
    fn subscription_patch_shapes() {
        let cancel = serde_json::to_value(SubscriptionPatch::Cancel {
            cancel_at_period_end: true,
        })
        .unwrap();
        assert_eq!(cancel, serde_json::json!({"cancel_at_period_end": true}));

        let product = serde_json::to_value(SubscriptionPatch::Product { product_id: "prod_2" }).unwrap();
        assert_eq!(product, serde_json::json!({"product_id": "prod_2"}));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = PaymentApiConfig::new("https://api.example.test/", "token");
        assert_eq!(config.api_base_url, "https://api.example.test");
    }
}
