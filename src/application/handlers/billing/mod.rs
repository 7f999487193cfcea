//! Billing handlers.
//!
//! ## Webhooks
//! - Verifying and processing provider deliveries
//! - Mirroring subscription lifecycle events
//! - Recording payments and granting purchased courses
//!
//! ## Commands
//! - Course checkout (free enrollment or hosted checkout)
//! - Subscription cancel / resume / plan change
//!
//! ## Queries
//! - Current subscription

mod checkout_course;
mod dispatch_billing_event;
mod get_subscription;
mod handle_webhook;
mod manage_subscription;
mod payment_ledger;
mod subscription_lifecycle;

// Webhooks
pub use dispatch_billing_event::BillingEventDispatcher;
pub use handle_webhook::{HandleWebhookCommand, HandleWebhookHandler};
pub use payment_ledger::{LedgerResult, PaymentLedgerHandler};
pub use subscription_lifecycle::{SubscriptionEventResult, SubscriptionLifecycleHandler};

// Commands
pub use checkout_course::{CheckoutCourseCommand, CheckoutCourseHandler, CheckoutCourseResult};
pub use manage_subscription::{
    ManageSubscriptionCommand, ManageSubscriptionHandler, SubscriptionAction,
};

// Queries
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, SubscriptionSummary};
