//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `UserRepository`, `SubscriptionRepository`, `PaymentRepository`,
//!   `EnrollmentRepository` - write side of the entitlement store
//! - `CatalogReader` - course and coupon lookups
//! - `EntitlementStore` - all of the above in one bound
//! - `WebhookEventRepository` - webhook delivery idempotency tracking
//!
//! ## External Service Ports
//!
//! - `PaymentProvider` - hosted checkout and subscription changes
//! - `AuthProvider` - identity creation, code exchange and deletion
//! - `SessionValidator` - bearer token validation
//! - `NotificationSender` / `Notifier` - best-effort user notifications

mod auth_provider;
mod catalog_reader;
mod enrollment_repository;
mod entitlement_store;
mod notifier;
mod payment_provider;
mod payment_repository;
mod session_validator;
mod subscription_repository;
mod user_repository;
mod webhook_event_repository;

pub use auth_provider::{AuthProvider, ExternalIdentity, IdentityError, IdentitySession};
pub use catalog_reader::CatalogReader;
pub use enrollment_repository::EnrollmentRepository;
pub use entitlement_store::EntitlementStore;
pub use notifier::{NotificationSender, Notifier};
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    ProviderSubscription, SubscriptionUpdate,
};
pub use payment_repository::PaymentRepository;
pub use session_validator::SessionValidator;
pub use subscription_repository::SubscriptionRepository;
pub use user_repository::UserRepository;
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, WebhookResult,
};
