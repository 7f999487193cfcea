//! ManageSubscriptionHandler - Command handler for user-initiated subscription changes.
//!
//! Changes go to the provider first; the local row is updated only after the
//! provider accepts. Later webhooks carry the authoritative state.

use std::sync::Arc;

use crate::domain::billing::{BillingError, BillingInterval, PlanCatalog, Subscription};
use crate::domain::foundation::UserId;
use crate::ports::{PaymentProvider, SubscriptionRepository, SubscriptionUpdate};

/// A change the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionAction {
    Cancel,
    Resume,
    ChangePlan {
        plan_id: String,
        interval: BillingInterval,
    },
}

impl SubscriptionAction {
    /// Builds an action from request fields.
    pub fn parse(
        action: &str,
        plan_id: Option<&str>,
        interval: Option<&str>,
    ) -> Result<Self, BillingError> {
        match action {
            "cancel" => Ok(SubscriptionAction::Cancel),
            "resume" => Ok(SubscriptionAction::Resume),
            "change_plan" => {
                let plan_id = plan_id
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| BillingError::validation("planId", "planId is required"))?;
                let interval = match interval {
                    None => BillingInterval::default(),
                    Some(raw) => BillingInterval::parse(raw).ok_or_else(|| {
                        BillingError::validation("interval", "interval must be 'month' or 'year'")
                    })?,
                };
                Ok(SubscriptionAction::ChangePlan {
                    plan_id: plan_id.to_string(),
                    interval,
                })
            }
            other => Err(BillingError::validation(
                "action",
                format!("Unknown action '{}'", other),
            )),
        }
    }
}

/// Command to change the caller's subscription.
#[derive(Debug, Clone)]
pub struct ManageSubscriptionCommand {
    pub user_id: UserId,
    pub action: SubscriptionAction,
}

/// Handler for subscription management.
pub struct ManageSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    plans: Arc<PlanCatalog>,
}

impl ManageSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        plans: Arc<PlanCatalog>,
    ) -> Self {
        Self {
            subscriptions,
            payment_provider,
            plans,
        }
    }

    pub async fn handle(&self, cmd: ManageSubscriptionCommand) -> Result<Subscription, BillingError> {
        let mut subscription = self
            .subscriptions
            .find_current_subscription(&cmd.user_id)
            .await?
            .filter(|s| !s.external_id.is_empty())
            .ok_or(BillingError::SubscriptionNotFound)?;

        let update = match &cmd.action {
            SubscriptionAction::Cancel => SubscriptionUpdate::CancelAtPeriodEnd(true),
            SubscriptionAction::Resume => SubscriptionUpdate::CancelAtPeriodEnd(false),
            SubscriptionAction::ChangePlan { plan_id, interval } => {
                let product_id = self
                    .plans
                    .product_for(plan_id, *interval)
                    .ok_or_else(|| BillingError::plan_not_configured(plan_id, interval.as_str()))?;
                SubscriptionUpdate::ChangeProduct {
                    product_id: product_id.to_string(),
                }
            }
        };

        self.payment_provider
            .update_subscription(&subscription.external_id, update)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    subscription_id = %subscription.external_id,
                    "Subscription update rejected by provider"
                );
                BillingError::provider(e.to_string())
            })?;

        match &cmd.action {
            SubscriptionAction::Cancel => subscription.set_cancel_at_period_end(true),
            SubscriptionAction::Resume => subscription.set_cancel_at_period_end(false),
            SubscriptionAction::ChangePlan { plan_id, .. } => subscription.change_plan(plan_id),
        }
        self.subscriptions.update_subscription(&subscription).await?;

        tracing::info!(
            user_id = %cmd.user_id,
            subscription_id = %subscription.external_id,
            action = ?cmd.action,
            "Subscription changed"
        );

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEntitlementStore;
    use crate::adapters::payment::MockPaymentProvider;
    use crate::domain::account::User;
    use crate::domain::foundation::ErrorCode;
    use crate::ports::{PaymentError, UserRepository};

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct Fixture {
        store: Arc<InMemoryEntitlementStore>,
        provider: MockPaymentProvider,
        handler: ManageSubscriptionHandler,
        user_id: UserId,
    }

    async fn fixture(with_subscription: bool) -> Fixture {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let provider = MockPaymentProvider::new();
        let user = User::register("ext-1", "ada@example.com", "Ada", None);
        store.insert_user(&user).await.unwrap();
        let user_id = user.id;
        if with_subscription {
            let sub = Subscription::start(user_id, "sub_1", "pro", None, None);
            store.insert_subscription(&sub).await.unwrap();
        }
        let plans = PlanCatalog::default().with_product("team", BillingInterval::Year, "prod_team_y");
        let handler =
            ManageSubscriptionHandler::new(store.clone(), Arc::new(provider.clone()), Arc::new(plans));
        Fixture {
            store,
            provider,
            handler,
            user_id,
        }
    }

    fn command(f: &Fixture, action: SubscriptionAction) -> ManageSubscriptionCommand {
        ManageSubscriptionCommand {
            user_id: f.user_id,
            action,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Action Parsing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn change_plan_requires_plan_id() {
        let err = SubscriptionAction::parse("change_plan", None, None).unwrap_err();
        assert_eq!(err.field(), Some("planId"));
    }

    #[test]
    fn change_plan_defaults_to_monthly() {
        let action = SubscriptionAction::parse("change_plan", Some("pro"), None).unwrap();
        assert_eq!(
            action,
            SubscriptionAction::ChangePlan {
                plan_id: "pro".to_string(),
                interval: BillingInterval::Month
            }
        );
    }

    #[test]
    fn unknown_action_is_validation_error() {
        let err = SubscriptionAction::parse("pause", None, None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    // ══════════════════════════════════════════════════════════════
    // Handler
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn cancel_then_resume_toggles_flag() {
        let f = fixture(true).await;

        let canceled = f.handler.handle(command(&f, SubscriptionAction::Cancel)).await.unwrap();
        assert!(canceled.cancel_at_period_end);

        let resumed = f.handler.handle(command(&f, SubscriptionAction::Resume)).await.unwrap();
        assert!(!resumed.cancel_at_period_end);

        let updates = f.provider.subscription_updates();
        assert_eq!(updates[0], ("sub_1".to_string(), SubscriptionUpdate::CancelAtPeriodEnd(true)));
        assert_eq!(updates[1], ("sub_1".to_string(), SubscriptionUpdate::CancelAtPeriodEnd(false)));
        assert!(!f.store.subscriptions().await[0].cancel_at_period_end);
    }

    #[tokio::test]
    async fn change_plan_switches_product_and_local_plan() {
        let f = fixture(true).await;
        let action = SubscriptionAction::ChangePlan {
            plan_id: "team".to_string(),
            interval: BillingInterval::Year,
        };

        let updated = f.handler.handle(command(&f, action)).await.unwrap();

        assert_eq!(updated.plan_id, "team");
        assert_eq!(
            f.provider.subscription_updates()[0].1,
            SubscriptionUpdate::ChangeProduct {
                product_id: "prod_team_y".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unconfigured_plan_is_bad_request() {
        let f = fixture(true).await;
        let action = SubscriptionAction::ChangePlan {
            plan_id: "team".to_string(),
            interval: BillingInterval::Month,
        };

        let err = f.handler.handle(command(&f, action)).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn no_subscription_is_not_found() {
        let f = fixture(false).await;

        let err = f.handler.handle(command(&f, SubscriptionAction::Cancel)).await.unwrap_err();

        assert_eq!(err, BillingError::SubscriptionNotFound);
    }

    #[tokio::test]
    async fn provider_failure_leaves_row_untouched() {
        let f = fixture(true).await;
        f.provider.fail_with(PaymentError::provider("boom"));

        let err = f.handler.handle(command(&f, SubscriptionAction::Cancel)).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(!f.store.subscriptions().await[0].cancel_at_period_end);
    }
}
