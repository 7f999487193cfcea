//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::account::{
    CompleteSignInCommand, CompleteSignInHandler, CompleteSignInResult, RegisterUserCommand,
    RegisterUserHandler, RegistrationCompensator,
};
pub use handlers::billing::{
    BillingEventDispatcher, CheckoutCourseCommand, CheckoutCourseHandler, CheckoutCourseResult,
    GetSubscriptionHandler, GetSubscriptionQuery, HandleWebhookCommand, HandleWebhookHandler,
    ManageSubscriptionCommand, ManageSubscriptionHandler, PaymentLedgerHandler,
    SubscriptionAction, SubscriptionLifecycleHandler, SubscriptionSummary,
};
