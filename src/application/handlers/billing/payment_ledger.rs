//! PaymentLedgerHandler - Records provider payments and grants purchased courses.
//!
//! Payments are keyed by the provider's checkout id, or the order id for
//! orders that did not come from a hosted checkout. Inserting a known id is
//! a no-op, so redelivered events converge on one row.
//!
//! Events may arrive in any order. A successful `checkout.updated` or an
//! `order.created` settles the row whether or not `checkout.created` was
//! seen, and a late `checkout.created` never moves a settled row back to
//! pending.
//!
//! When a payment completes for a `course_purchase` checkout, the buyer is
//! enrolled. Both `checkout.updated` and `order.created` can report the same
//! purchase; the enrollment uniqueness makes the second grant a no-op.

use std::sync::Arc;

use serde_json::Value;

use super::subscription_lifecycle::known_user;
use crate::domain::account::User;
use crate::domain::billing::{
    CheckoutPayload, Course, Enrollment, EventMetadata, OrderPayload, Payment, WebhookError,
};
use crate::domain::foundation::CourseId;
use crate::domain::notification::Notification;
use crate::ports::{CatalogReader, EnrollmentRepository, Notifier, PaymentRepository, UserRepository};

const DEFAULT_CURRENCY: &str = "usd";

/// Outcome of a ledger event.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerResult {
    Recorded(Payment),
    Completed(Payment),
    /// Nothing to change (duplicate insert, already settled, still pending).
    Unchanged,
}

/// Buyer and course of a course purchase, both known locally.
struct Purchase {
    user: User,
    course: Course,
}

/// Handler for `checkout.*` and `order.created` events.
pub struct PaymentLedgerHandler {
    payments: Arc<dyn PaymentRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    users: Arc<dyn UserRepository>,
    catalog: Arc<dyn CatalogReader>,
    notifier: Arc<dyn Notifier>,
}

impl PaymentLedgerHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        users: Arc<dyn UserRepository>,
        catalog: Arc<dyn CatalogReader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            payments,
            enrollments,
            users,
            catalog,
            notifier,
        }
    }

    /// `checkout.created` - record a pending payment.
    pub async fn handle_checkout_created(
        &self,
        checkout: &CheckoutPayload,
        raw: &Value,
    ) -> Result<LedgerResult, WebhookError> {
        let user = known_user(self.users.as_ref(), checkout.metadata.user_id.as_deref()).await?;
        let payment = Payment::pending(
            user.id,
            &checkout.id,
            checkout.amount.unwrap_or(0),
            checkout_currency(checkout),
            describe(&checkout.metadata, checkout.product.as_ref().and_then(|p| p.name.as_deref())),
            raw.clone(),
        );

        // A row that exists may already be settled by an earlier success.
        if !self.insert(&payment).await? {
            return Ok(LedgerResult::Unchanged);
        }

        tracing::info!(payment_id = %checkout.id, amount = payment.amount, "Pending payment recorded");
        Ok(LedgerResult::Recorded(payment))
    }

    /// `checkout.updated` - settle the payment once the provider reports success.
    pub async fn handle_checkout_updated(
        &self,
        checkout: &CheckoutPayload,
        raw: &Value,
    ) -> Result<LedgerResult, WebhookError> {
        if !checkout.is_succeeded() {
            tracing::debug!(
                payment_id = %checkout.id,
                status = %checkout.status,
                "Checkout not settled yet"
            );
            return Ok(LedgerResult::Unchanged);
        }

        let purchase = self.purchase(&checkout.metadata).await?;

        let result = match self.payments.find_payment_by_external_id(&checkout.id).await? {
            Some(payment) => self.complete(payment).await?,
            None => {
                tracing::info!(
                    payment_id = %checkout.id,
                    "Checkout succeeded before it was recorded, settling from the update"
                );
                let user =
                    known_user(self.users.as_ref(), checkout.metadata.user_id.as_deref()).await?;
                let payment = Payment::completed(
                    user.id,
                    &checkout.id,
                    checkout.amount.unwrap_or(0),
                    checkout_currency(checkout),
                    describe(
                        &checkout.metadata,
                        checkout.product.as_ref().and_then(|p| p.name.as_deref()),
                    ),
                    raw.clone(),
                );
                self.settle(payment).await?
            }
        };

        if let Some(purchase) = purchase {
            self.enroll(purchase, &checkout.id).await?;
        }

        Ok(result)
    }

    /// `order.created` - record a settled payment, or settle the checkout it came from.
    pub async fn handle_order_created(
        &self,
        order: &OrderPayload,
        raw: &Value,
    ) -> Result<LedgerResult, WebhookError> {
        let user = known_user(self.users.as_ref(), order.metadata.user_id.as_deref()).await?;
        let purchase = self.purchase(&order.metadata).await?;

        let ledger_key = order
            .checkout_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&order.id);

        let result = match self.payments.find_payment_by_external_id(ledger_key).await? {
            Some(payment) => self.complete(payment).await?,
            None => {
                let payment = Payment::completed(
                    user.id,
                    ledger_key,
                    order.amount,
                    &order.currency,
                    describe(&order.metadata, order.product.as_ref().and_then(|p| p.name.as_deref())),
                    raw.clone(),
                );
                self.settle(payment).await?
            }
        };

        tracing::info!(
            order_id = %order.id,
            payment_id = %ledger_key,
            amount = order.amount,
            billing_reason = order.billing_reason.as_deref().unwrap_or("unknown"),
            "Order received"
        );

        if let Some(purchase) = purchase {
            self.enroll(purchase, ledger_key).await?;
        }

        Ok(result)
    }

    /// Inserts a payment. Returns false if the external id was already recorded.
    async fn insert(&self, payment: &Payment) -> Result<bool, WebhookError> {
        match self.payments.insert_payment(payment).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_conflict() => {
                tracing::debug!(payment_id = %payment.external_id, "Payment already recorded");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Inserts a settled payment, completing the row a concurrent event won with.
    async fn settle(&self, payment: Payment) -> Result<LedgerResult, WebhookError> {
        if self.insert(&payment).await? {
            tracing::info!(payment_id = %payment.external_id, amount = payment.amount, "Settled payment recorded");
            return Ok(LedgerResult::Recorded(payment));
        }

        match self.payments.find_payment_by_external_id(&payment.external_id).await? {
            Some(existing) => self.complete(existing).await,
            None => Ok(LedgerResult::Unchanged),
        }
    }

    async fn complete(&self, mut payment: Payment) -> Result<LedgerResult, WebhookError> {
        if !payment.complete() {
            return Ok(LedgerResult::Unchanged);
        }
        self.payments.update_payment(&payment).await?;
        tracing::info!(payment_id = %payment.external_id, "Payment completed");
        Ok(LedgerResult::Completed(payment))
    }

    /// Resolves a course purchase before anything is written, so a bad
    /// reference fails the delivery without a partial ledger entry.
    async fn purchase(&self, metadata: &EventMetadata) -> Result<Option<Purchase>, WebhookError> {
        if !metadata.is_course_purchase() {
            return Ok(None);
        }

        let user = known_user(self.users.as_ref(), metadata.user_id.as_deref()).await?;
        let course_id: CourseId = metadata
            .course_id
            .as_deref()
            .ok_or(WebhookError::MissingMetadata("courseId"))?
            .parse()
            .map_err(|_| WebhookError::ParseError("courseId metadata is not a UUID".to_string()))?;
        let course = self
            .catalog
            .find_course_by_id(&course_id)
            .await?
            .ok_or_else(|| WebhookError::UnknownReference(format!("courseId {}", course_id)))?;

        Ok(Some(Purchase { user, course }))
    }

    /// Enrolls the buyer for a completed course purchase.
    async fn enroll(&self, purchase: Purchase, payment_external_id: &str) -> Result<(), WebhookError> {
        let Purchase { user, course } = purchase;

        if self.enrollments.find_enrollment(&user.id, &course.id).await?.is_some() {
            tracing::debug!(user_id = %user.id, course_id = %course.id, "Already enrolled");
            return Ok(());
        }

        let enrollment = Enrollment::purchased(user.id, course.id, payment_external_id);
        match self.enrollments.insert_enrollment(&enrollment).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            user_id = %user.id,
            course_id = %course.id,
            payment_id = %payment_external_id,
            "Course purchase enrolled"
        );

        self.notifier.notify(Notification::EnrollmentConfirmed {
            to: user.email,
            name: user.display_name,
            course_title: course.title,
        });
        Ok(())
    }
}

fn checkout_currency(checkout: &CheckoutPayload) -> String {
    checkout
        .currency
        .clone()
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn describe(metadata: &EventMetadata, product_name: Option<&str>) -> String {
    if metadata.is_course_purchase() {
        let course = metadata
            .course_slug
            .as_deref()
            .or(metadata.course_id.as_deref())
            .unwrap_or("unknown");
        return format!("Course purchase: {}", course);
    }
    if let Some(plan) = metadata.plan_id.as_deref() {
        return format!("Subscription: {}", plan);
    }
    match product_name {
        Some(name) => format!("Purchase: {}", name),
        None => "Purchase".to_string(),
    }
}
