//! Entitlement store - the full persistence surface in one bound.
//!
//! Handlers depend on the narrow repository ports. Composition code takes a
//! single backend that implements all of them and hands out each view.

use super::{
    CatalogReader, EnrollmentRepository, PaymentRepository, SubscriptionRepository,
    UserRepository,
};

/// A backend that persists users, subscriptions, payments and enrollments
/// and serves catalog reads.
pub trait EntitlementStore:
    UserRepository + SubscriptionRepository + PaymentRepository + EnrollmentRepository + CatalogReader
{
}

impl<T> EntitlementStore for T where
    T: UserRepository
        + SubscriptionRepository
        + PaymentRepository
        + EnrollmentRepository
        + CatalogReader
{
}
