//! HTTP DTOs for billing endpoints.
//!
//! JSON field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::application::{CheckoutCourseResult, SubscriptionSummary};
use crate::domain::billing::Subscription;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /checkout/{courseSlug}`. May be empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Body of `POST /subscription`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageSubscriptionRequest {
    pub action: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for `POST /webhook`.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Response for `POST /checkout/{courseSlug}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum CheckoutResponse {
    Enrolled { enrolled: bool, enrollment_id: String },
    Redirect { checkout_url: String },
}

impl From<CheckoutCourseResult> for CheckoutResponse {
    fn from(result: CheckoutCourseResult) -> Self {
        match result {
            CheckoutCourseResult::Enrolled { enrollment_id } => CheckoutResponse::Enrolled {
                enrolled: true,
                enrollment_id: enrollment_id.to_string(),
            },
            CheckoutCourseResult::Redirect { checkout_url } => {
                CheckoutResponse::Redirect { checkout_url }
            }
        }
    }
}

/// Subscription as returned by `GET /subscription`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub plan_id: String,
    pub status: String,
    pub current_period_start: Option<String>,
    pub current_period_end: Option<String>,
    pub cancel_at_period_end: bool,
}

fn rfc3339(ts: Option<Timestamp>) -> Option<String> {
    ts.map(|t| t.as_datetime().to_rfc3339())
}

impl From<SubscriptionSummary> for SubscriptionResponse {
    fn from(summary: SubscriptionSummary) -> Self {
        Self {
            plan_id: summary.plan_id,
            status: summary.status.as_str().to_string(),
            current_period_start: rfc3339(summary.current_period_start),
            current_period_end: rfc3339(summary.current_period_end),
            cancel_at_period_end: summary.cancel_at_period_end,
        }
    }
}

/// Full subscription row as returned by `POST /subscription`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetailResponse {
    pub id: String,
    pub user_id: String,
    pub external_id: String,
    pub plan_id: String,
    pub status: String,
    pub current_period_start: Option<String>,
    pub current_period_end: Option<String>,
    pub cancel_at_period_end: bool,
    pub updated_at: String,
}

impl From<Subscription> for SubscriptionDetailResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id.to_string(),
            user_id: sub.user_id.to_string(),
            external_id: sub.external_id,
            plan_id: sub.plan_id,
            status: sub.status.as_str().to_string(),
            current_period_start: rfc3339(sub.current_period_start),
            current_period_end: rfc3339(sub.current_period_end),
            cancel_at_period_end: sub.cancel_at_period_end,
            updated_at: sub.updated_at.as_datetime().to_rfc3339(),
        }
    }
}
