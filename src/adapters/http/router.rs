//! Application router and state wiring.
//!
//! `AppState::new` builds every per-module state from one entitlement store
//! plus the external collaborators. `app_router` adds the cross-cutting
//! layers: request ids, tracing, timeout, compression and CORS.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Request};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::account::{account_routes, AccountAppState};
use super::billing::{billing_routes, webhook_routes, BillingAppState};
use super::middleware::AuthState;
use super::response::ApiResponse;
use crate::application::{
    BillingEventDispatcher, HandleWebhookHandler, PaymentLedgerHandler,
    SubscriptionLifecycleHandler,
};
use crate::domain::billing::{IdempotentWebhookProcessor, PlanCatalog, WebhookVerifier};
use crate::ports::{
    AuthProvider, EntitlementStore, Notifier, PaymentProvider, SessionValidator,
    WebhookEventRepository,
};

/// External services the application talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Billing settings that come from configuration.
#[derive(Debug, Clone)]
pub struct BillingSettings {
    pub webhook_secret: String,
    pub checkout_success_url: String,
    pub plans: PlanCatalog,
}

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

/// State for every module router.
#[derive(Clone)]
pub struct AppState {
    pub billing: BillingAppState,
    pub account: AccountAppState,
    pub auth: AuthState,
}

impl AppState {
    pub fn new<S>(
        store: Arc<S>,
        webhook_events: Arc<dyn WebhookEventRepository>,
        collaborators: Collaborators,
        settings: BillingSettings,
    ) -> Self
    where
        S: EntitlementStore + 'static,
    {
        let Collaborators {
            payment_provider,
            auth_provider,
            session_validator,
            notifier,
        } = collaborators;

        let lifecycle = Arc::new(SubscriptionLifecycleHandler::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
        ));
        let ledger = Arc::new(PaymentLedgerHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            notifier.clone(),
        ));
        let processor = Arc::new(IdempotentWebhookProcessor::new(
            webhook_events,
            Arc::new(BillingEventDispatcher::new(lifecycle, ledger)),
        ));
        let webhooks = Arc::new(HandleWebhookHandler::new(
            Arc::new(WebhookVerifier::new(&settings.webhook_secret)),
            processor,
        ));

        Self {
            billing: BillingAppState {
                catalog: store.clone(),
                enrollments: store.clone(),
                subscriptions: store.clone(),
                payment_provider,
                notifier: notifier.clone(),
                plans: Arc::new(settings.plans),
                checkout_success_url: settings.checkout_success_url,
                webhooks,
            },
            account: AccountAppState {
                auth_provider,
                users: store.clone(),
                notifier,
            },
            auth: AuthState::new(session_validator, store),
        }
    }
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
}

/// GET /health - Liveness probe
async fn health() -> ApiResponse<Health> {
    ApiResponse::ok(Health { status: "ok" })
}

/// All routes, without cross-cutting layers.
pub fn api_router(state: AppState) -> Router {
    let billing = billing_routes(state.auth.clone())
        .merge(webhook_routes())
        .with_state(state.billing);
    let account = account_routes().with_state(state.account);

    Router::new()
        .route("/health", get(health))
        .merge(billing)
        .merge(account)
}

/// All routes with the cross-cutting layers applied.
pub fn app_router(state: AppState, settings: &HttpSettings) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    api_router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(trace)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(settings.request_timeout))
            .layer(CompressionLayer::new())
            .layer(cors_layer(&settings.cors_origins)),
    )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed = origins.iter().filter_map(|origin| match HeaderValue::from_str(origin) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
            None
        }
    });
    layer.allow_origin(AllowOrigin::list(allowed))
}
