//! Typed payment provider webhook events.
//!
//! The wire format is `{ "type": "...", "data": { ... } }`. Each known type is
//! decoded into its own payload struct at the boundary so handlers never poke
//! at untyped JSON. Types we do not handle are kept as `Unknown` and
//! acknowledged without side effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::webhook_errors::WebhookError;
use crate::domain::foundation::Timestamp;

/// Metadata `type` marker attached to single-course checkouts.
pub const COURSE_PURCHASE: &str = "course_purchase";

/// Metadata attached to checkouts we create, echoed back on every event.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub purchase_type: Option<String>,
}

impl EventMetadata {
    /// Metadata for a single-course checkout.
    pub fn course_purchase(user_id: String, course_id: String, course_slug: String) -> Self {
        Self {
            user_id: Some(user_id),
            course_id: Some(course_id),
            course_slug: Some(course_slug),
            plan_id: None,
            purchase_type: Some(COURSE_PURCHASE.to_string()),
        }
    }

    pub fn is_course_purchase(&self) -> bool {
        self.purchase_type.as_deref() == Some(COURSE_PURCHASE)
    }
}

/// Product summary embedded in checkout and order payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `checkout.created` / `checkout.updated` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutPayload {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub product: Option<ProductSummary>,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl CheckoutPayload {
    /// Provider statuses that mean the money has moved.
    pub fn is_succeeded(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "confirmed")
    }
}

/// `subscription.*` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPayload {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl SubscriptionPayload {
    pub fn period_start(&self) -> Option<Timestamp> {
        self.current_period_start.map(Timestamp::from_datetime)
    }

    pub fn period_end(&self) -> Option<Timestamp> {
        self.current_period_end.map(Timestamp::from_datetime)
    }
}

/// `order.created` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub billing_reason: Option<String>,
    #[serde(default)]
    pub checkout_id: Option<String>,
    #[serde(default)]
    pub product: Option<ProductSummary>,
    #[serde(default)]
    pub metadata: EventMetadata,
}

/// A decoded webhook event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    CheckoutCreated(CheckoutPayload),
    CheckoutUpdated(CheckoutPayload),
    SubscriptionCreated(SubscriptionPayload),
    SubscriptionUpdated(SubscriptionPayload),
    SubscriptionActive(SubscriptionPayload),
    SubscriptionCanceled(SubscriptionPayload),
    SubscriptionRevoked(SubscriptionPayload),
    OrderCreated(OrderPayload),
    /// A type we do not handle, with its `data` object untouched.
    Unknown { event_type: String, data: Value },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Value,
}

/// A verified delivery, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedEvent {
    /// Delivery id from the `webhook-id` header. Stable across retries.
    pub delivery_id: String,
    pub event_type: String,
    pub event: ProviderEvent,
    /// The `data` object exactly as delivered.
    pub data: Value,
}

impl ProviderEvent {
    /// Decodes a raw webhook body.
    ///
    /// Returns the wire type, the typed event and the untouched `data` object.
    pub fn decode(body: &[u8]) -> Result<(String, ProviderEvent, Value), WebhookError> {
        let raw: RawEvent =
            serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let event = match raw.event_type.as_str() {
            "checkout.created" => ProviderEvent::CheckoutCreated(typed(&raw.data)?),
            "checkout.updated" => ProviderEvent::CheckoutUpdated(typed(&raw.data)?),
            "subscription.created" => ProviderEvent::SubscriptionCreated(typed(&raw.data)?),
            "subscription.updated" => ProviderEvent::SubscriptionUpdated(typed(&raw.data)?),
            "subscription.active" => ProviderEvent::SubscriptionActive(typed(&raw.data)?),
            "subscription.canceled" => ProviderEvent::SubscriptionCanceled(typed(&raw.data)?),
            "subscription.revoked" => ProviderEvent::SubscriptionRevoked(typed(&raw.data)?),
            "order.created" => ProviderEvent::OrderCreated(typed(&raw.data)?),
            other => ProviderEvent::Unknown {
                event_type: other.to_string(),
                data: raw.data.clone(),
            },
        };

        Ok((raw.event_type, event, raw.data))
    }
}

fn typed<T: serde::de::DeserializeOwned>(data: &Value) -> Result<T, WebhookError> {
    T::deserialize(data).map_err(|e| WebhookError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn decodes_subscription_created_with_metadata() {
        let (event_type, event, _) = ProviderEvent::decode(&body(json!({
            "type": "subscription.created",
            "data": {
                "id": "sub_1",
                "status": "active",
                "current_period_start": "2024-01-01T00:00:00Z",
                "current_period_end": "2024-02-01T00:00:00Z",
                "metadata": { "userId": "u-1", "planId": "pro" }
            }
        })))
        .unwrap();

        assert_eq!(event_type, "subscription.created");
        match event {
            ProviderEvent::SubscriptionCreated(payload) => {
                assert_eq!(payload.id, "sub_1");
                assert_eq!(payload.metadata.user_id.as_deref(), Some("u-1"));
                assert_eq!(payload.metadata.plan_id.as_deref(), Some("pro"));
                assert!(payload.period_start().is_some());
                assert!(!payload.cancel_at_period_end);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn decodes_order_with_course_purchase_marker() {
        let (_, event, _) = ProviderEvent::decode(&body(json!({
            "type": "order.created",
            "data": {
                "id": "ord_1",
                "amount": 4900,
                "currency": "usd",
                "metadata": { "userId": "u-1", "courseId": "c-1", "type": "course_purchase" }
            }
        })))
        .unwrap();

        match event {
            ProviderEvent::OrderCreated(order) => {
                assert!(order.metadata.is_course_purchase());
                assert_eq!(order.amount, 4900);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_preserved_not_rejected() {
        let (_, event, data) = ProviderEvent::decode(&body(json!({
            "type": "benefit.granted",
            "data": { "anything": true }
        })))
        .unwrap();

        assert_eq!(
            event,
            ProviderEvent::Unknown {
                event_type: "benefit.granted".to_string(),
                data: json!({ "anything": true }),
            }
        );
        assert_eq!(data, json!({ "anything": true }));
    }

    #[test]
    fn known_type_with_bad_payload_is_parse_error() {
        let result = ProviderEvent::decode(&body(json!({
            "type": "checkout.created",
            "data": { "status": "open" }
        })));

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn non_json_body_is_parse_error() {
        assert!(matches!(
            ProviderEvent::decode(b"not json"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn checkout_success_statuses() {
        let mut checkout = CheckoutPayload {
            id: "chk".to_string(),
            status: "open".to_string(),
            amount: None,
            currency: None,
            customer_email: None,
            product: None,
            metadata: EventMetadata::default(),
        };
        assert!(!checkout.is_succeeded());
        checkout.status = "succeeded".to_string();
        assert!(checkout.is_succeeded());
        checkout.status = "confirmed".to_string();
        assert!(checkout.is_succeeded());
    }
}
