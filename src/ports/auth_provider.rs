//! Identity provider port for account creation and sign-in.
//!
//! # When to Use
//!
//! - **SessionValidator**: validates bearer tokens on incoming requests
//! - **AuthProvider**: creates, exchanges and deletes identities
//!
//! `delete_user` exists for one reason: rolling back an identity whose local
//! user row could not be written.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::Registration;

/// Identity as known by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Provider subject id.
    pub id: String,
    pub email: Option<String>,
    /// Display name from provider metadata.
    pub name: Option<String>,
    /// Locale from provider metadata.
    pub locale: Option<String>,
}

/// Session returned by a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires.
    pub expires_in: i64,
    pub identity: ExternalIdentity,
}

/// Errors from identity provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Email already registered")]
    EmailTaken,

    /// The provider refused the input (weak password, blocked domain, ...).
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Invalid or expired authorization code")]
    InvalidCode,

    #[error("Identity not found")]
    NotFound,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Port for the external identity service.
///
/// # Contract
///
/// - `sign_up` returns `EmailTaken` when the email is already registered
/// - `exchange_code` returns `InvalidCode` for unknown or expired codes
/// - transport or 5xx failures are `Unavailable`
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an identity with email and password.
    async fn sign_up(&self, registration: &Registration) -> Result<ExternalIdentity, IdentityError>;

    /// Exchange an authorization code from a sign-in callback for a session.
    async fn exchange_code(&self, code: &str) -> Result<IdentitySession, IdentityError>;

    /// Permanently delete an identity.
    async fn delete_user(&self, external_id: &str) -> Result<(), IdentityError>;
}
