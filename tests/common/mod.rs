//! Shared harness for HTTP integration tests.
//!
//! Builds the full router over the in-memory entitlement store and mock
//! collaborators, with one registered user holding the bearer token
//! `TOKEN`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use course_market::adapters::auth::{MockAuthProvider, MockSessionValidator};
use course_market::adapters::http::{api_router, AppState, BillingSettings, Collaborators};
use course_market::adapters::memory::{InMemoryEntitlementStore, InMemoryWebhookEventRepository};
use course_market::adapters::notification::RecordingNotifier;
use course_market::adapters::payment::MockPaymentProvider;
use course_market::domain::account::User;
use course_market::domain::billing::{BillingInterval, Course, PlanCatalog, WebhookVerifier};
use course_market::domain::foundation::CourseId;
use course_market::ports::UserRepository;

pub const WEBHOOK_SECRET: &str = "whsec_dGVzdC1zZWNyZXQ=";
pub const TOKEN: &str = "token-ada";
pub const EXTERNAL_ID: &str = "ext-ada";

pub struct Harness {
    pub store: Arc<InMemoryEntitlementStore>,
    pub webhook_events: Arc<InMemoryWebhookEventRepository>,
    pub payments: Arc<MockPaymentProvider>,
    pub auth: Arc<MockAuthProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub user: User,
    baseline_writes: u64,
    router: Router,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_auth(MockAuthProvider::new()).await
    }

    pub async fn with_auth(auth: MockAuthProvider) -> Self {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let webhook_events = Arc::new(InMemoryWebhookEventRepository::new());
        let payments = Arc::new(MockPaymentProvider::new());
        let auth = Arc::new(auth);
        let notifier = Arc::new(RecordingNotifier::new());

        let user = User::register(EXTERNAL_ID, "ada@example.com", "Ada", None);
        store.insert_user(&user).await.unwrap();

        let state = AppState::new(
            store.clone(),
            webhook_events.clone(),
            Collaborators {
                payment_provider: payments.clone(),
                auth_provider: auth.clone(),
                session_validator: Arc::new(MockSessionValidator::new().with_token(TOKEN, EXTERNAL_ID)),
                notifier: notifier.clone(),
            },
            BillingSettings {
                webhook_secret: WEBHOOK_SECRET.to_string(),
                checkout_success_url: "https://courses.example/success".to_string(),
                plans: PlanCatalog::default()
                    .with_product("pro", BillingInterval::Month, "prod_pro_monthly")
                    .with_product("pro", BillingInterval::Year, "prod_pro_yearly"),
            },
        );

        Self {
            baseline_writes: store.write_count(),
            store,
            webhook_events,
            payments,
            auth,
            notifier,
            user,
            router: api_router(state),
        }
    }

    /// Store writes made after setup.
    pub fn writes(&self) -> u64 {
        self.store.write_count() - self.baseline_writes
    }

    /// Adds a published course and returns it.
    pub async fn add_course(&self, slug: &str, price: i64, product_ref: Option<&str>) -> Course {
        let course = Course {
            id: CourseId::new(),
            slug: slug.to_string(),
            title: slug.replace('-', " "),
            published: true,
            price,
            currency: "usd".to_string(),
            product_ref: product_ref.map(str::to_string),
        };
        self.store.add_course(course.clone()).await;
        course
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Authenticated JSON request as the harness user.
    pub async fn authed(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN));
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    /// Unauthenticated JSON POST.
    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Delivers a correctly signed webhook.
    pub async fn deliver(&self, delivery_id: &str, event: Value) -> (StatusCode, Value) {
        let body = event.to_string();
        let timestamp = chrono::Utc::now().timestamp();
        let signature = WebhookVerifier::new(WEBHOOK_SECRET)
            .sign(delivery_id, timestamp, body.as_bytes())
            .unwrap();
        self.deliver_raw(delivery_id, timestamp, &signature, body).await
    }

    pub async fn deliver_raw(
        &self,
        delivery_id: &str,
        timestamp: i64,
        signature: &str,
        body: String,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .header("webhook-id", delivery_id)
            .header("webhook-timestamp", timestamp.to_string())
            .header("webhook-signature", signature)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}
