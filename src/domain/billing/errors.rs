//! Billing-specific error types.
//!
//! Errors surfaced by checkout and subscription management.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CourseNotFound, SubscriptionNotFound | 404 |
//! | AlreadyEnrolled | 409 |
//! | CourseUnpublished, MissingProductReference, PlanNotConfigured | 400 |
//! | InvalidCoupon, ValidationFailed | 400 |
//! | Provider, Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode};

/// Billing-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    CourseNotFound(String),

    CourseUnpublished(String),

    /// The user already holds an enrollment for the course.
    AlreadyEnrolled(String),

    /// Paid course has no payment provider product configured.
    MissingProductReference(String),

    InvalidCoupon {
        code: String,
        reason: String,
    },

    SubscriptionNotFound,

    PlanNotConfigured {
        plan_id: String,
        interval: String,
    },

    ValidationFailed {
        field: String,
        message: String,
    },

    /// The payment provider rejected or failed the request.
    Provider(String),

    Infrastructure(String),
}

impl BillingError {
    pub fn course_not_found(slug: impl Into<String>) -> Self {
        BillingError::CourseNotFound(slug.into())
    }

    pub fn course_unpublished(slug: impl Into<String>) -> Self {
        BillingError::CourseUnpublished(slug.into())
    }

    pub fn already_enrolled(slug: impl Into<String>) -> Self {
        BillingError::AlreadyEnrolled(slug.into())
    }

    pub fn missing_product_reference(slug: impl Into<String>) -> Self {
        BillingError::MissingProductReference(slug.into())
    }

    pub fn invalid_coupon(code: impl Into<String>, reason: impl Into<String>) -> Self {
        BillingError::InvalidCoupon {
            code: code.into(),
            reason: reason.into(),
        }
    }

    pub fn plan_not_configured(plan_id: impl Into<String>, interval: impl Into<String>) -> Self {
        BillingError::PlanNotConfigured {
            plan_id: plan_id.into(),
            interval: interval.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        BillingError::Provider(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::CourseNotFound(_) | BillingError::SubscriptionNotFound => {
                ErrorCode::NotFound
            }
            BillingError::AlreadyEnrolled(_) => ErrorCode::Conflict,
            BillingError::CourseUnpublished(_)
            | BillingError::MissingProductReference(_)
            | BillingError::PlanNotConfigured { .. } => ErrorCode::BadRequest,
            BillingError::InvalidCoupon { .. } | BillingError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            BillingError::Provider(_) | BillingError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a user-facing error message.
    ///
    /// Provider and infrastructure details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            BillingError::CourseNotFound(slug) => format!("Course '{}' not found", slug),
            BillingError::CourseUnpublished(slug) => {
                format!("Course '{}' is not available for enrollment", slug)
            }
            BillingError::AlreadyEnrolled(slug) => {
                format!("Already enrolled in course '{}'", slug)
            }
            BillingError::MissingProductReference(slug) => {
                format!("Course '{}' is not configured for purchase", slug)
            }
            BillingError::InvalidCoupon { code, reason } => {
                format!("Coupon '{}' is invalid: {}", code, reason)
            }
            BillingError::SubscriptionNotFound => "No active subscription".to_string(),
            BillingError::PlanNotConfigured { plan_id, interval } => {
                format!("Plan '{}' is not available with {} billing", plan_id, interval)
            }
            BillingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::Provider(_) => "Payment provider request failed".to_string(),
            BillingError::Infrastructure(_) => "Internal server error".to_string(),
        }
    }

    /// Field the error refers to, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            BillingError::ValidationFailed { field, .. } => Some(field),
            BillingError::InvalidCoupon { .. } => Some("couponCode"),
            _ => None,
        }
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingError::Provider(detail) => write!(f, "Payment provider error: {}", detail),
            BillingError::Infrastructure(detail) => write!(f, "Infrastructure error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        BillingError::Infrastructure(err.to_string())
    }
}
