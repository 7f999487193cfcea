//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::response::{ApiError, ApiResponse};
use crate::application::{
    CheckoutCourseCommand, CheckoutCourseHandler, CheckoutCourseResult, GetSubscriptionHandler,
    GetSubscriptionQuery, HandleWebhookCommand, HandleWebhookHandler, ManageSubscriptionCommand,
    ManageSubscriptionHandler, SubscriptionAction,
};
use crate::domain::billing::{PlanCatalog, SignatureHeaders, WebhookError};
use crate::ports::{
    CatalogReader, EnrollmentRepository, Notifier, PaymentProvider, SubscriptionRepository,
};

use super::dto::{
    CheckoutRequest, CheckoutResponse, ManageSubscriptionRequest, SubscriptionDetailResponse,
    SubscriptionResponse, WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for billing endpoints.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct BillingAppState {
    pub catalog: Arc<dyn CatalogReader>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub plans: Arc<PlanCatalog>,
    pub checkout_success_url: String,
    pub webhooks: Arc<HandleWebhookHandler>,
}

impl BillingAppState {
    pub fn checkout_handler(&self) -> CheckoutCourseHandler {
        CheckoutCourseHandler::new(
            self.catalog.clone(),
            self.enrollments.clone(),
            self.payment_provider.clone(),
            self.notifier.clone(),
            self.checkout_success_url.clone(),
        )
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscriptions.clone())
    }

    pub fn manage_subscription_handler(&self) -> ManageSubscriptionHandler {
        ManageSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.payment_provider.clone(),
            self.plans.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════════

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// POST /webhook - Receive a payment provider event
///
/// The body is taken as raw bytes; the signature covers the exact payload.
pub async fn receive_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = HandleWebhookCommand {
        headers: SignatureHeaders {
            id: header(&headers, "webhook-id"),
            timestamp: header(&headers, "webhook-timestamp"),
            signature: header(&headers, "webhook-signature"),
        },
        body: body.to_vec(),
    };

    match state.webhooks.handle(cmd).await {
        Ok(_) | Err(WebhookError::Ignored(_)) => Ok(ApiResponse::ok(WebhookAck { received: true })),
        Err(e) => Err(e.into()),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout
// ════════════════════════════════════════════════════════════════════════════════

/// POST /checkout/{courseSlug} - Enroll in a free course or start paid checkout
///
/// The body is optional; an empty body means no coupon.
pub async fn checkout_course(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
    Path(course_slug): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CheckoutRequest::default()
    } else {
        let Json(request) = Json::<CheckoutRequest>::from_bytes(&body)?;
        request
    };

    let cmd = CheckoutCourseCommand {
        user_id: user.id,
        email: user.email,
        name: user.display_name,
        course_slug,
        coupon_code: request.coupon_code,
    };

    let result = state.checkout_handler().handle(cmd).await?;

    let status = match result {
        CheckoutCourseResult::Enrolled { .. } => StatusCode::CREATED,
        CheckoutCourseResult::Redirect { .. } => StatusCode::OK,
    };

    Ok((status, ApiResponse::ok(CheckoutResponse::from(result))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscription
// ════════════════════════════════════════════════════════════════════════════════

/// GET /subscription - Current subscription, or the free plan
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .get_subscription_handler()
        .handle(GetSubscriptionQuery { user_id: user.id })
        .await?;

    Ok(ApiResponse::ok(SubscriptionResponse::from(summary)))
}

/// POST /subscription - Cancel, resume or change plan
pub async fn manage_subscription(
    State(state): State<BillingAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<ManageSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let action = SubscriptionAction::parse(
        &request.action,
        request.plan_id.as_deref(),
        request.interval.as_deref(),
    )?;

    let message = match &action {
        SubscriptionAction::Cancel => "Subscription will cancel at the end of the period",
        SubscriptionAction::Resume => "Subscription resumed",
        SubscriptionAction::ChangePlan { .. } => "Subscription plan changed",
    };

    let updated = state
        .manage_subscription_handler()
        .handle(ManageSubscriptionCommand {
            user_id: user.id,
            action,
        })
        .await?;

    Ok(ApiResponse::ok(SubscriptionDetailResponse::from(updated)).with_message(message))
}
