//! Subscription repository port.
//!
//! Rows are keyed for updates by the provider's subscription id; lifecycle
//! events never carry our internal id.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, UserId};

/// Persistence for mirrored subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a row with the same `external_id` exists
    /// - `DatabaseError` on persistence failure
    async fn insert_subscription(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Overwrite the mutable fields of an existing row, matched by id.
    async fn update_subscription(&self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn find_subscription_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// The user's most recently created subscription, if any.
    async fn find_current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError>;
}
