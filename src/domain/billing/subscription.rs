//! Subscription aggregate and its status state machine.
//!
//! The payment provider is the source of truth for subscription status. Local
//! rows mirror what the provider reported through lifecycle events; nothing
//! here guesses a status on its own.

use crate::domain::foundation::{StateMachine, SubscriptionId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plan identifier reported for users without a subscription row.
pub const FREE_PLAN_ID: &str = "free";

/// Subscription status as mirrored from the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    Unpaid,
    Incomplete,
    Trialing,
}

impl SubscriptionStatus {
    /// Maps a provider status string onto the local status set.
    ///
    /// Unrecognized values map to `Active`.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "active" => SubscriptionStatus::Active,
            "canceled" => SubscriptionStatus::Canceled,
            "past_due" => SubscriptionStatus::PastDue,
            "unpaid" => SubscriptionStatus::Unpaid,
            "incomplete" => SubscriptionStatus::Incomplete,
            "trialing" => SubscriptionStatus::Trialing,
            _ => SubscriptionStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::Trialing => "trialing",
        }
    }

    /// Parses the stored representation. Unlike `from_provider`, this is strict.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "canceled" => Some(SubscriptionStatus::Canceled),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "unpaid" => Some(SubscriptionStatus::Unpaid),
            "incomplete" => Some(SubscriptionStatus::Incomplete),
            "trialing" => Some(SubscriptionStatus::Trialing),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for SubscriptionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Active => vec![PastDue, Unpaid, Incomplete, Trialing, Canceled],
            PastDue => vec![Active, Unpaid, Incomplete, Trialing, Canceled],
            Unpaid => vec![Active, PastDue, Incomplete, Trialing, Canceled],
            Incomplete => vec![Active, PastDue, Unpaid, Trialing, Canceled],
            Trialing => vec![Active, PastDue, Unpaid, Incomplete, Canceled],
            // Terminal for this external id. A new subscription starts a new row.
            Canceled => vec![],
        }
    }
}

/// A lifecycle change reported by the provider for an existing subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionChange {
    /// Full refresh of status, period bounds and cancellation flag.
    Updated {
        status: SubscriptionStatus,
        current_period_start: Option<Timestamp>,
        current_period_end: Option<Timestamp>,
        cancel_at_period_end: bool,
    },
    Activated,
    Canceled,
    /// Access removed immediately; the period is cleared.
    Revoked,
}

/// Result of applying a change, for the caller to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTransition {
    pub from: SubscriptionStatus,
    pub to: SubscriptionStatus,
    /// False when the provider moved the subscription along an edge the local
    /// lifecycle does not expect. The change is applied regardless.
    pub expected: bool,
}

/// Locally mirrored subscription for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    /// Provider subscription id. Unique across all rows.
    pub external_id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Starts a new subscription lifecycle. Always `Active`.
    pub fn start(
        user_id: UserId,
        external_id: impl Into<String>,
        plan_id: impl Into<String>,
        current_period_start: Option<Timestamp>,
        current_period_end: Option<Timestamp>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            user_id,
            external_id: external_id.into(),
            plan_id: plan_id.into(),
            status: SubscriptionStatus::Active,
            current_period_start,
            current_period_end,
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a provider-reported change.
    pub fn apply(&mut self, change: SubscriptionChange) -> AppliedTransition {
        let from = self.status;
        match change {
            SubscriptionChange::Updated {
                status,
                current_period_start,
                current_period_end,
                cancel_at_period_end,
            } => {
                self.status = status;
                self.current_period_start = current_period_start;
                self.current_period_end = current_period_end;
                self.cancel_at_period_end = cancel_at_period_end;
            }
            SubscriptionChange::Activated => {
                self.status = SubscriptionStatus::Active;
            }
            SubscriptionChange::Canceled => {
                self.status = SubscriptionStatus::Canceled;
                self.cancel_at_period_end = true;
            }
            SubscriptionChange::Revoked => {
                self.status = SubscriptionStatus::Canceled;
                self.current_period_start = None;
                self.current_period_end = None;
                self.cancel_at_period_end = false;
            }
        }
        self.updated_at = Timestamp::now();

        AppliedTransition {
            from,
            to: self.status,
            expected: from.can_transition_to(&self.status),
        }
    }

    /// Mirrors a cancel/resume request that the provider just accepted.
    pub fn set_cancel_at_period_end(&mut self, cancel: bool) {
        self.cancel_at_period_end = cancel;
        self.updated_at = Timestamp::now();
    }

    /// Mirrors a plan switch that the provider just accepted.
    pub fn change_plan(&mut self, plan_id: impl Into<String>) {
        self.plan_id = plan_id.into();
        self.updated_at = Timestamp::now();
    }
}
