//! SubscriptionLifecycleHandler - Mirrors provider subscription events locally.
//!
//! The provider is authoritative. Every event is applied even when it moves
//! the subscription along an edge the local lifecycle does not expect; such
//! moves are logged. Events for subscriptions we never saw are skipped.

use std::sync::Arc;

use crate::domain::account::User;
use crate::domain::billing::{
    Subscription, SubscriptionChange, SubscriptionPayload, SubscriptionStatus, WebhookError,
};
use crate::domain::foundation::UserId;
use crate::domain::notification::Notification;
use crate::ports::{Notifier, SubscriptionRepository, UserRepository};

/// Outcome of a lifecycle event, mainly for tests and logs.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEventResult {
    Created(Subscription),
    Updated(Subscription),
    /// Duplicate `subscription.created` for a known external id.
    AlreadyExists,
    /// No local row for the external id.
    Unmatched,
}

/// Handler for `subscription.*` events.
pub struct SubscriptionLifecycleHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
}

impl SubscriptionLifecycleHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            subscriptions,
            users,
            notifier,
        }
    }

    /// `subscription.created` - start a lifecycle for the metadata user.
    pub async fn handle_created(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<SubscriptionEventResult, WebhookError> {
        let user = known_user(self.users.as_ref(), payload.metadata.user_id.as_deref()).await?;
        let plan_id = payload
            .metadata
            .plan_id
            .clone()
            .or_else(|| payload.product_id.clone())
            .ok_or(WebhookError::MissingMetadata("planId"))?;

        if self
            .subscriptions
            .find_subscription_by_external_id(&payload.id)
            .await?
            .is_some()
        {
            tracing::debug!(subscription_id = %payload.id, "Subscription already recorded");
            return Ok(SubscriptionEventResult::AlreadyExists);
        }

        let subscription = Subscription::start(
            user.id,
            &payload.id,
            plan_id,
            payload.period_start(),
            payload.period_end(),
        );

        match self.subscriptions.insert_subscription(&subscription).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                tracing::debug!(subscription_id = %payload.id, "Subscription inserted concurrently");
                return Ok(SubscriptionEventResult::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            subscription_id = %payload.id,
            user_id = %subscription.user_id,
            plan_id = %subscription.plan_id,
            "Subscription created"
        );

        self.notifier.notify(Notification::SubscriptionConfirmed {
            to: user.email,
            name: user.display_name,
            plan_id: subscription.plan_id.clone(),
        });

        Ok(SubscriptionEventResult::Created(subscription))
    }

    /// `subscription.updated` - full refresh from the provider payload.
    pub async fn handle_updated(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<SubscriptionEventResult, WebhookError> {
        let status = SubscriptionStatus::from_provider(&payload.status);
        self.apply(
            payload,
            SubscriptionChange::Updated {
                status,
                current_period_start: payload.period_start(),
                current_period_end: payload.period_end(),
                cancel_at_period_end: payload.cancel_at_period_end,
            },
        )
        .await
    }

    pub async fn handle_active(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<SubscriptionEventResult, WebhookError> {
        self.apply(payload, SubscriptionChange::Activated).await
    }

    pub async fn handle_canceled(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<SubscriptionEventResult, WebhookError> {
        self.apply(payload, SubscriptionChange::Canceled).await
    }

    pub async fn handle_revoked(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<SubscriptionEventResult, WebhookError> {
        self.apply(payload, SubscriptionChange::Revoked).await
    }

    async fn apply(
        &self,
        payload: &SubscriptionPayload,
        change: SubscriptionChange,
    ) -> Result<SubscriptionEventResult, WebhookError> {
        let Some(mut subscription) = self
            .subscriptions
            .find_subscription_by_external_id(&payload.id)
            .await?
        else {
            tracing::warn!(
                subscription_id = %payload.id,
                "Subscription event for unknown subscription, skipping"
            );
            return Ok(SubscriptionEventResult::Unmatched);
        };

        let transition = subscription.apply(change);
        if !transition.expected {
            tracing::warn!(
                subscription_id = %payload.id,
                from = transition.from.as_str(),
                to = transition.to.as_str(),
                "Unexpected subscription transition applied"
            );
        }

        self.subscriptions.update_subscription(&subscription).await?;

        tracing::info!(
            subscription_id = %payload.id,
            from = transition.from.as_str(),
            to = transition.to.as_str(),
            "Subscription updated"
        );

        Ok(SubscriptionEventResult::Updated(subscription))
    }
}

/// Parses the `userId` metadata value.
pub(super) fn metadata_user_id(value: Option<&str>) -> Result<UserId, WebhookError> {
    let raw = value
        .filter(|v| !v.trim().is_empty())
        .ok_or(WebhookError::MissingMetadata("userId"))?;
    raw.parse()
        .map_err(|_| WebhookError::ParseError(format!("userId metadata is not a UUID: {}", raw)))
}

/// Loads the `userId` metadata user. A well-formed id with no local user is
/// an `UnknownReference`, which is not retried.
pub(super) async fn known_user(
    users: &dyn UserRepository,
    value: Option<&str>,
) -> Result<User, WebhookError> {
    let user_id = metadata_user_id(value)?;
    users
        .find_user_by_id(&user_id)
        .await?
        .ok_or_else(|| WebhookError::UnknownReference(format!("userId {}", user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEntitlementStore;
    use crate::adapters::notification::RecordingNotifier;
    use crate::domain::account::User;
    use crate::domain::billing::EventMetadata;
    use chrono::{TimeZone, Utc};

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct Fixture {
        store: Arc<InMemoryEntitlementStore>,
        notifier: Arc<RecordingNotifier>,
        handler: SubscriptionLifecycleHandler,
        user: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let user = User::register("ext-1", "ada@example.com", "Ada", None);
        store.insert_user(&user).await.unwrap();

        let handler = SubscriptionLifecycleHandler::new(store.clone(), store.clone(), notifier.clone());
        Fixture {
            store,
            notifier,
            handler,
            user,
        }
    }

    fn payload(id: &str, status: &str, user_id: Option<UserId>) -> SubscriptionPayload {
        SubscriptionPayload {
            id: id.to_string(),
            status: status.to_string(),
            current_period_start: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            current_period_end: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            cancel_at_period_end: false,
            product_id: Some("prod_pro".to_string()),
            metadata: EventMetadata {
                user_id: user_id.map(|u| u.to_string()),
                plan_id: Some("pro".to_string()),
                ..EventMetadata::default()
            },
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Created
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn created_inserts_active_subscription_and_notifies() {
        let f = fixture().await;

        let result = f
            .handler
            .handle_created(&payload("sub_1", "incomplete", Some(f.user.id)))
            .await
            .unwrap();

        assert!(matches!(result, SubscriptionEventResult::Created(_)));
        let subs = f.store.subscriptions().await;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].status, SubscriptionStatus::Active);
        assert_eq!(subs[0].plan_id, "pro");
        assert_eq!(f.notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_created_is_a_no_op() {
        let f = fixture().await;
        let p = payload("sub_1", "active", Some(f.user.id));

        f.handler.handle_created(&p).await.unwrap();
        let second = f.handler.handle_created(&p).await.unwrap();

        assert_eq!(second, SubscriptionEventResult::AlreadyExists);
        assert_eq!(f.store.subscriptions().await.len(), 1);
        assert_eq!(f.notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn created_without_user_metadata_fails_validation() {
        let f = fixture().await;

        let result = f.handler.handle_created(&payload("sub_1", "active", None)).await;

        assert!(matches!(result, Err(WebhookError::MissingMetadata("userId"))));
        assert!(f.store.subscriptions().await.is_empty());
    }

    #[tokio::test]
    async fn created_for_unknown_user_is_rejected_without_writes() {
        let f = fixture().await;
        let writes_before = f.store.write_count();

        let result = f
            .handler
            .handle_created(&payload("sub_1", "active", Some(UserId::new())))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, WebhookError::UnknownReference(_)));
        assert!(!err.is_retryable());
        assert_eq!(f.store.write_count(), writes_before);
        assert!(f.notifier.notifications().is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Lifecycle
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn created_canceled_revoked_ends_canceled_with_no_period() {
        let f = fixture().await;
        let p = payload("sub_1", "active", Some(f.user.id));

        f.handler.handle_created(&p).await.unwrap();
        f.handler.handle_canceled(&p).await.unwrap();
        let canceled = f.store.subscriptions().await.remove(0);
        assert_eq!(canceled.status, SubscriptionStatus::Canceled);
        assert!(canceled.cancel_at_period_end);

        f.handler.handle_revoked(&p).await.unwrap();
        let revoked = f.store.subscriptions().await.remove(0);
        assert_eq!(revoked.status, SubscriptionStatus::Canceled);
        assert!(revoked.current_period_start.is_none());
        assert!(revoked.current_period_end.is_none());
        assert!(!revoked.cancel_at_period_end);
    }

    #[tokio::test]
    async fn updated_maps_provider_status_and_flags() {
        let f = fixture().await;
        let p = payload("sub_1", "active", Some(f.user.id));
        f.handler.handle_created(&p).await.unwrap();

        let mut update = payload("sub_1", "past_due", None);
        update.cancel_at_period_end = true;
        f.handler.handle_updated(&update).await.unwrap();

        let sub = f.store.subscriptions().await.remove(0);
        assert_eq!(sub.status, SubscriptionStatus::PastDue);
        assert!(sub.cancel_at_period_end);
    }

    #[tokio::test]
    async fn updated_with_unknown_provider_status_becomes_active() {
        let f = fixture().await;
        let p = payload("sub_1", "active", Some(f.user.id));
        f.handler.handle_created(&p).await.unwrap();

        f.handler
            .handle_updated(&payload("sub_1", "paused", None))
            .await
            .unwrap();

        assert_eq!(f.store.subscriptions().await[0].status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn events_for_unknown_subscription_write_nothing() {
        let f = fixture().await;
        let writes_before = f.store.write_count();

        let result = f
            .handler
            .handle_updated(&payload("sub_missing", "active", None))
            .await
            .unwrap();

        assert_eq!(result, SubscriptionEventResult::Unmatched);
        assert_eq!(f.store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn leaving_canceled_is_applied() {
        let f = fixture().await;
        let p = payload("sub_1", "active", Some(f.user.id));
        f.handler.handle_created(&p).await.unwrap();
        f.handler.handle_canceled(&p).await.unwrap();

        f.handler.handle_active(&p).await.unwrap();

        assert_eq!(f.store.subscriptions().await[0].status, SubscriptionStatus::Active);
    }
}
