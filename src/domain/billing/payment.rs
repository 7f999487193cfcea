//! Payment ledger entries.
//!
//! A payment is written once per provider checkout or order and only ever
//! moves from `pending` to `completed`. Rows are never deleted.

use crate::domain::foundation::{PaymentId, StateMachine, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Payment settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            _ => None,
        }
    }
}

impl StateMachine for PaymentStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            PaymentStatus::Pending => vec![PaymentStatus::Completed],
            PaymentStatus::Completed => vec![],
        }
    }
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    /// Provider checkout or order id. Unique across all rows.
    pub external_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub description: String,
    /// Event data exactly as delivered, kept for audit.
    pub raw_payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// Records a payment attempt that has not settled yet.
    pub fn pending(
        user_id: UserId,
        external_id: impl Into<String>,
        amount: i64,
        currency: impl Into<String>,
        description: impl Into<String>,
        raw_payload: serde_json::Value,
    ) -> Self {
        Self::with_status(
            PaymentStatus::Pending,
            user_id,
            external_id.into(),
            amount,
            currency.into(),
            description.into(),
            raw_payload,
        )
    }

    /// Records a payment the provider already reports as settled.
    pub fn completed(
        user_id: UserId,
        external_id: impl Into<String>,
        amount: i64,
        currency: impl Into<String>,
        description: impl Into<String>,
        raw_payload: serde_json::Value,
    ) -> Self {
        Self::with_status(
            PaymentStatus::Completed,
            user_id,
            external_id.into(),
            amount,
            currency.into(),
            description.into(),
            raw_payload,
        )
    }

    fn with_status(
        status: PaymentStatus,
        user_id: UserId,
        external_id: String,
        amount: i64,
        currency: String,
        description: String,
        raw_payload: serde_json::Value,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            user_id,
            external_id,
            amount,
            currency,
            status,
            description,
            raw_payload,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the payment completed. Returns false if it already was.
    pub fn complete(&mut self) -> bool {
        if self.status == PaymentStatus::Completed {
            return false;
        }
        self.status = PaymentStatus::Completed;
        self.updated_at = Timestamp::now();
        true
    }
}
