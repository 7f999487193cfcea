//! Response envelope shared by every endpoint.
//!
//! Success: `{ "success": true, "data": ..., "message"?: ... }`
//! Failure: `{ "success": false, "error": { "code", "message", "details"? } }`
//!
//! `ApiError` is the single place where domain errors become HTTP responses.
//! Internal failures are logged here and rendered with a generic message.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::account::AccountError;
use crate::domain::billing::{BillingError, WebhookError};
use crate::domain::foundation::{AuthError, DomainError, ErrorCode};

const INTERNAL_MESSAGE: &str = "Internal server error";

// ════════════════════════════════════════════════════════════════════════════════
// Envelopes
// ════════════════════════════════════════════════════════════════════════════════

/// Successful response envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Error body inside the failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

/// Failure response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

// ════════════════════════════════════════════════════════════════════════════════
// ApiError
// ════════════════════════════════════════════════════════════════════════════════

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: String,
    details: BTreeMap<String, String>,
}

impl ApiError {
    /// Creates an error whose status follows from its code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: status_for(code),
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// Generic 500 that leaks nothing about the cause.
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, INTERNAL_MESSAGE)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Adds `details.field` when a field is known.
    fn with_field(self, field: Option<&str>) -> Self {
        match field {
            Some(field) => self.with_detail("field", field),
            None => self,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// HTTP status for each error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::BadRequest | ErrorCode::InvalidSignature => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ExternalServiceError | ErrorCode::DatabaseError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code.as_str().to_string(),
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        if err.code() == ErrorCode::InternalError {
            tracing::error!(error = %err, "Billing request failed");
            return ApiError::internal();
        }
        ApiError::new(err.code(), err.message()).with_field(err.field())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        if err.code() == ErrorCode::InternalError {
            tracing::error!(error = %err, "Account request failed");
            return ApiError::internal();
        }
        ApiError::new(err.code(), err.message()).with_field(err.field())
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err.error_code() {
            ErrorCode::InvalidSignature => {
                ApiError::new(ErrorCode::InvalidSignature, "Webhook signature verification failed")
            }
            ErrorCode::ValidationFailed => {
                ApiError::new(ErrorCode::ValidationFailed, "Webhook payload is invalid")
            }
            _ => {
                tracing::error!(error = %err, "Webhook processing failed");
                ApiError::internal()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => ApiError::unauthorized("Token expired"),
            AuthError::InvalidToken => ApiError::unauthorized("Invalid token"),
            AuthError::UserNotFound => ApiError::unauthorized("Unknown user"),
            AuthError::InsufficientPermissions => {
                ApiError::new(ErrorCode::Forbidden, "Insufficient permissions")
            }
            AuthError::ServiceUnavailable(msg) => {
                tracing::error!(error = %msg, "Auth service unavailable");
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorCode::ValidationFailed, rejection.body_text())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ExternalServiceError | ErrorCode::DatabaseError | ErrorCode::InternalError => {
                tracing::error!(error = %err, "Request failed");
                ApiError::internal()
            }
            code => {
                let field = err.details.get("field").cloned();
                ApiError::new(code, err.message).with_field(field.as_deref())
            }
        }
    }
}
