//! `PaymentRepository` for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::{corrupt, expect_updated, read_error, write_error, PostgresEntitlementStore};
use crate::domain::billing::{Payment, PaymentStatus};
use crate::domain::foundation::{DomainError, PaymentId, Timestamp, UserId};
use crate::ports::PaymentRepository;

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    external_id: String,
    amount: i64,
    currency: String,
    status: String,
    description: String,
    raw_payload: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status =
            PaymentStatus::parse(&row.status).ok_or_else(|| corrupt("status", &row.status))?;

        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            external_id: row.external_id,
            amount: row.amount,
            currency: row.currency,
            status,
            description: row.description,
            raw_payload: row.raw_payload,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresEntitlementStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, external_id, amount, currency, status, description,
                raw_payload, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_uuid())
        .bind(&payment.external_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(&payment.description)
        .bind(&payment.raw_payload)
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to insert payment", e))?;

        Ok(())
    }

    async fn update_payment(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                description = $3,
                raw_payload = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.status.as_str())
        .bind(&payment.description)
        .bind(&payment.raw_payload)
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to update payment", e))?;

        expect_updated(result, "Payment")
    }

    async fn find_payment_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, external_id, amount, currency, status, description,
                   raw_payload, created_at, updated_at
            FROM payments
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch payment", e))?;

        row.map(Payment::try_from).transpose()
    }
}
