//! RegistrationCompensator - Rolls back an identity whose local user row failed.
//!
//! Signup creates the identity first and the local user second. If the
//! second step fails the identity would be orphaned: the email is taken at
//! the provider but the user cannot sign in here. The compensator deletes it.

use std::sync::Arc;

use crate::domain::account::AccountError;
use crate::domain::foundation::DomainError;
use crate::ports::AuthProvider;

/// Deletes orphaned identities after a failed local insert.
pub struct RegistrationCompensator {
    auth_provider: Arc<dyn AuthProvider>,
}

impl RegistrationCompensator {
    pub fn new(auth_provider: Arc<dyn AuthProvider>) -> Self {
        Self { auth_provider }
    }

    /// Deletes the identity exactly once and returns the error to surface.
    ///
    /// The returned error always describes the original failure; a failed
    /// deletion is only logged.
    pub async fn compensate(&self, external_id: &str, cause: &DomainError) -> AccountError {
        tracing::error!(
            external_id = %external_id,
            error = %cause,
            "Local user insert failed after identity creation, rolling back identity"
        );

        match self.auth_provider.delete_user(external_id).await {
            Ok(()) => {
                tracing::info!(external_id = %external_id, "Orphaned identity deleted");
            }
            Err(delete_error) => {
                tracing::error!(
                    external_id = %external_id,
                    error = %cause,
                    delete_error = %delete_error,
                    "Identity rollback failed, identity is orphaned"
                );
            }
        }

        AccountError::registration_failed(cause.to_string())
    }
}
