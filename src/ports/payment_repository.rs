//! Payment ledger repository port.

use async_trait::async_trait;

use crate::domain::billing::Payment;
use crate::domain::foundation::DomainError;

/// Persistence for payment ledger entries. Entries are never deleted.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a ledger entry.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a row with the same `external_id` exists
    /// - `DatabaseError` on persistence failure
    async fn insert_payment(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Persist a status change, matched by id.
    async fn update_payment(&self, payment: &Payment) -> Result<(), DomainError>;

    async fn find_payment_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Payment>, DomainError>;
}
