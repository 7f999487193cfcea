//! Account-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | Rejected | 400 |
//! | EmailTaken | 409 |
//! | InvalidAuthorizationCode | 401 |
//! | RegistrationFailed, Provider, Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Account-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    ValidationFailed { field: String, message: String },

    /// An identity already exists for this email.
    EmailTaken,

    /// The identity provider refused the signup input.
    Rejected(String),

    /// The sign-in code could not be exchanged for a session.
    InvalidAuthorizationCode,

    /// The identity was created but the local user could not be stored.
    /// The identity has been rolled back (or the rollback was logged).
    RegistrationFailed(String),

    Provider(String),

    Infrastructure(String),
}

impl AccountError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AccountError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        AccountError::Rejected(message.into())
    }

    pub fn registration_failed(message: impl Into<String>) -> Self {
        AccountError::RegistrationFailed(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        AccountError::Provider(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AccountError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            AccountError::EmailTaken => ErrorCode::Conflict,
            AccountError::Rejected(_) => ErrorCode::BadRequest,
            AccountError::InvalidAuthorizationCode => ErrorCode::Unauthorized,
            AccountError::RegistrationFailed(_)
            | AccountError::Provider(_)
            | AccountError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            AccountError::ValidationFailed { message, .. } => message.clone(),
            AccountError::EmailTaken => "An account with this email already exists".to_string(),
            AccountError::Rejected(reason) => reason.clone(),
            AccountError::InvalidAuthorizationCode => {
                "Sign-in link is invalid or has expired".to_string()
            }
            AccountError::RegistrationFailed(_) => {
                "Registration failed, please try again".to_string()
            }
            AccountError::Provider(_) | AccountError::Infrastructure(_) => {
                "Internal server error".to_string()
            }
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            AccountError::ValidationFailed { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::RegistrationFailed(detail) => {
                write!(f, "Registration failed: {}", detail)
            }
            AccountError::Provider(detail) => write!(f, "Identity provider error: {}", detail),
            AccountError::Infrastructure(detail) => write!(f, "Infrastructure error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<ValidationError> for AccountError {
    fn from(err: ValidationError) -> Self {
        AccountError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        AccountError::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_keeps_field() {
        let err: AccountError = ValidationError::empty_field("name").into();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(AccountError::EmailTaken.code(), ErrorCode::Conflict);
        assert_eq!(AccountError::rejected("weak").code(), ErrorCode::BadRequest);
        assert_eq!(
            AccountError::InvalidAuthorizationCode.code(),
            ErrorCode::Unauthorized
        );
        assert_eq!(
            AccountError::registration_failed("db down").code(),
            ErrorCode::InternalError
        );
    }

    #[test]
    fn registration_failure_hides_detail_from_users() {
        let err = AccountError::registration_failed("unique violation users_pkey");
        assert!(!err.message().contains("users_pkey"));
        assert!(err.to_string().contains("users_pkey"));
    }
}
