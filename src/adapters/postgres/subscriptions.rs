//! `SubscriptionRepository` for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::{corrupt, expect_updated, read_error, write_error, PostgresEntitlementStore};
use crate::domain::billing::{Subscription, SubscriptionStatus};
use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::ports::SubscriptionRepository;

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    external_id: String,
    plan_id: String,
    status: String,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status =
            SubscriptionStatus::parse(&row.status).ok_or_else(|| corrupt("status", &row.status))?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            external_id: row.external_id,
            plan_id: row.plan_id,
            status,
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            cancel_at_period_end: row.cancel_at_period_end,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_SUBSCRIPTION: &str = r#"
    SELECT id, user_id, external_id, plan_id, status, current_period_start,
           current_period_end, cancel_at_period_end, created_at, updated_at
    FROM subscriptions
"#;

fn datetime(ts: Option<Timestamp>) -> Option<DateTime<Utc>> {
    ts.map(|t| *t.as_datetime())
}

#[async_trait]
impl SubscriptionRepository for PostgresEntitlementStore {
    async fn insert_subscription(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, external_id, plan_id, status, current_period_start,
                current_period_end, cancel_at_period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(&subscription.external_id)
        .bind(&subscription.plan_id)
        .bind(subscription.status.as_str())
        .bind(datetime(subscription.current_period_start))
        .bind(datetime(subscription.current_period_end))
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to insert subscription", e))?;

        Ok(())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_id = $2,
                status = $3,
                current_period_start = $4,
                current_period_end = $5,
                cancel_at_period_end = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(&subscription.plan_id)
        .bind(subscription.status.as_str())
        .bind(datetime(subscription.current_period_start))
        .bind(datetime(subscription.current_period_end))
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to update subscription", e))?;

        expect_updated(result, "Subscription")
    }

    async fn find_subscription_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE external_id = $1", SELECT_SUBSCRIPTION))
                .bind(external_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| read_error("Failed to fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
            SELECT_SUBSCRIPTION
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> SubscriptionRow {
        SubscriptionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            external_id: "sub_1".to_string(),
            plan_id: "pro".to_string(),
            status: status.to_string(),
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_subscription() {
        let sub = Subscription::try_from(row("past_due")).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PastDue);
        assert!(sub.cancel_at_period_end);
        assert!(sub.current_period_end.is_none());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Subscription::try_from(row("paused")).is_err());
    }
}
