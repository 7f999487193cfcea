//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, auth types, the state machine trait
//! and error types that the billing and account modules build on.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser, UserRole, VerifiedToken};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CourseId, EnrollmentId, PaymentId, SubscriptionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
