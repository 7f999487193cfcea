//! Axum router configuration for billing endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{
    checkout_course, get_subscription, manage_subscription, receive_webhook, BillingAppState,
};
use crate::adapters::http::middleware::{auth_middleware, AuthState};

/// Create the authenticated billing router.
///
/// # Routes
/// - `POST /checkout/:course_slug` - Enroll or start checkout
/// - `GET /subscription` - Current subscription
/// - `POST /subscription` - Manage subscription
pub fn billing_routes(auth: AuthState) -> Router<BillingAppState> {
    Router::new()
        .route("/checkout/:course_slug", post(checkout_course))
        .route(
            "/subscription",
            get(get_subscription).post(manage_subscription),
        )
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
}

/// Create the webhook router.
///
/// Separate from the billing routes because webhooks carry no user session;
/// they are trusted through their signature alone.
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/webhook", post(receive_webhook))
}
