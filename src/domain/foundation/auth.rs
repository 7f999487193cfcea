//! Authentication types for the domain layer.
//!
//! Two stages are modelled:
//!
//! - `VerifiedToken` is what the `SessionValidator` port extracts from a bearer
//!   token. It only knows the identity provider's subject id.
//! - `AuthenticatedUser` is the local user resolved from that subject. Handlers
//!   only ever see this type.
//!
//! Neither type depends on the identity provider implementation.

use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Claims extracted from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Subject id assigned by the identity provider.
    pub external_id: String,

    /// Email claim, when the provider includes it.
    pub email: Option<String>,
}

/// Role of a marketplace user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Local user resolved from a validated session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Internal user id.
    pub id: UserId,

    /// Identity provider subject id.
    pub external_id: String,

    pub email: String,

    pub display_name: String,

    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(
        id: UserId,
        external_id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id,
            external_id: external_id.into(),
            email: email.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Fails with `InsufficientPermissions` unless the user is an admin.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}

/// Authentication errors that can occur during token validation.
///
/// These errors are **domain-centric** - they describe what went wrong
/// from the application's perspective, not the auth provider's.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but no local user exists for its subject.
    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "ext-123", "test@example.com", "Test", role)
    }

    #[test]
    fn require_admin_allows_admins() {
        assert!(user_with_role(UserRole::Admin).require_admin().is_ok());
    }

    #[test]
    fn require_admin_rejects_regular_users() {
        let err = user_with_role(UserRole::User).require_admin().unwrap_err();
        assert!(matches!(err, AuthError::InsufficientPermissions));
    }

    #[test]
    fn role_parses_and_displays() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(UserRole::User.to_string(), "user");
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn auth_error_service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("Connection refused");
        assert_eq!(format!("{}", err), "Auth service unavailable: Connection refused");
    }

    #[test]
    fn auth_error_requires_reauthentication_for_token_errors() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(AuthError::UserNotFound.requires_reauthentication());
        assert!(!AuthError::InsufficientPermissions.requires_reauthentication());
        assert!(!AuthError::service_unavailable("").requires_reauthentication());
    }
}
