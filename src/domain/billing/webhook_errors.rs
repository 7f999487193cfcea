//! Webhook error types for payment provider webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use crate::domain::foundation::{DomainError, ErrorCode};
use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A required signature header was absent or empty.
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    /// No signature in the header matched the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Timestamp header is not an integer number of seconds.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to decode a verified payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata field missing from webhook event.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Metadata names a user or course that does not exist locally.
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    /// Event was intentionally ignored (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Storage operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// True for failures of the signature check itself.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingHeader(_)
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// Returns true if the provider should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine the provider's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingHeader(_)
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::UnknownReference(_) => StatusCode::BAD_REQUEST,

            // Ignored events are acknowledged as success
            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code rendered in the response envelope.
    pub fn error_code(&self) -> ErrorCode {
        if self.is_signature_failure() {
            return ErrorCode::InvalidSignature;
        }
        match self {
            WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::UnknownReference(_) => ErrorCode::ValidationFailed,
            _ => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        if err.is_unknown_reference() {
            return WebhookError::UnknownReference(err.message);
        }
        WebhookError::Database(err.to_string())
    }
}
