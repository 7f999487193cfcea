//! GetSubscriptionHandler - Query handler for the caller's current subscription.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Subscription, SubscriptionStatus, FREE_PLAN_ID};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::SubscriptionRepository;

/// Query for a user's subscription.
#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
}

/// Subscription as shown to the user. Users without one are on the free plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSummary {
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
}

impl SubscriptionSummary {
    pub fn free() -> Self {
        Self {
            plan_id: FREE_PLAN_ID.to_string(),
            status: SubscriptionStatus::Active,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }
}

impl From<&Subscription> for SubscriptionSummary {
    fn from(sub: &Subscription) -> Self {
        Self {
            plan_id: sub.plan_id.clone(),
            status: sub.status,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            cancel_at_period_end: sub.cancel_at_period_end,
        }
    }
}

/// Handler for subscription lookups.
pub struct GetSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(&self, query: GetSubscriptionQuery) -> Result<SubscriptionSummary, BillingError> {
        let current = self
            .subscriptions
            .find_current_subscription(&query.user_id)
            .await?;

        Ok(current
            .as_ref()
            .map(SubscriptionSummary::from)
            .unwrap_or_else(SubscriptionSummary::free))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEntitlementStore;
    use crate::domain::account::User;
    use crate::ports::UserRepository;

    #[tokio::test]
    async fn user_without_subscription_gets_free_default() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let handler = GetSubscriptionHandler::new(store);

        let summary = handler
            .handle(GetSubscriptionQuery { user_id: UserId::new() })
            .await
            .unwrap();

        assert_eq!(summary, SubscriptionSummary::free());
        assert_eq!(summary.plan_id, "free");
    }

    #[tokio::test]
    async fn returns_current_subscription() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let user = User::register("ext-1", "ada@example.com", "Ada", None);
        store.insert_user(&user).await.unwrap();
        let user_id = user.id;
        let sub = Subscription::start(user_id, "sub_1", "pro", None, None);
        store.insert_subscription(&sub).await.unwrap();
        let handler = GetSubscriptionHandler::new(store);

        let summary = handler.handle(GetSubscriptionQuery { user_id }).await.unwrap();

        assert_eq!(summary.plan_id, "pro");
        assert_eq!(summary.status, SubscriptionStatus::Active);
    }
}
