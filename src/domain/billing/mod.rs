//! Billing domain module.
//!
//! Mirrors payment provider state locally and decides who is entitled to
//! what.
//!
//! # Module Structure
//!
//! - `subscription` - Subscription aggregate and status state machine
//! - `payment` - Payment ledger entries
//! - `enrollment` - Course enrollment entitlement
//! - `catalog` - Read-only course and coupon types
//! - `plan` - Subscription plans and billing intervals
//! - `provider_event` - Typed webhook events
//! - `webhook_verifier` - Signature verification of inbound webhooks
//! - `webhook_processor` - Idempotent webhook dispatch

mod catalog;
mod enrollment;
mod errors;
mod payment;
mod plan;
mod provider_event;
mod subscription;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use catalog::{Coupon, CouponRejection, Course};
pub use enrollment::{Enrollment, EnrollmentSource};
pub use errors::BillingError;
pub use payment::{Payment, PaymentStatus};
pub use plan::{BillingInterval, PlanCatalog};
pub use provider_event::{
    CheckoutPayload, EventMetadata, OrderPayload, ProductSummary, ProviderEvent,
    SubscriptionPayload, VerifiedEvent, COURSE_PURCHASE,
};
pub use subscription::{
    AppliedTransition, Subscription, SubscriptionChange, SubscriptionStatus, FREE_PLAN_ID,
};
pub use webhook_errors::WebhookError;
pub use webhook_processor::{IdempotentWebhookProcessor, WebhookDispatcher};
pub use webhook_verifier::{SignatureHeaders, WebhookVerifier, TIMESTAMP_TOLERANCE_SECS};
