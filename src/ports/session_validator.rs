//! Session validation port for bearer token validation.
//!
//! Validates the access tokens issued by the identity provider. The result
//! only names the provider subject; resolving it to a local user is the HTTP
//! middleware's job.
//!
//! # Security Requirements
//!
//! All implementations MUST validate:
//! - **Signature**: Token must be signed by the identity provider
//! - **Audience (aud)**: Token must be intended for this application
//! - **Expiry (exp)**: Token must not be expired

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, VerifiedToken};

/// Validates access tokens and extracts the subject.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<VerifiedToken, AuthError>;
}
