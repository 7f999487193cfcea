//! Course enrollment entitlement.

use crate::domain::foundation::{CourseId, EnrollmentId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// How the enrollment was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentSource {
    Free,
    Purchase,
}

impl EnrollmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentSource::Free => "free",
            EnrollmentSource::Purchase => "purchase",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(EnrollmentSource::Free),
            "purchase" => Some(EnrollmentSource::Purchase),
            _ => None,
        }
    }
}

/// Grants a user access to a course.
///
/// At most one enrollment exists per (user, course) pair. Stores reject a
/// second insert with a conflict instead of overwriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub source: EnrollmentSource,
    /// Provider payment that paid for the course, for purchases.
    pub payment_external_id: Option<String>,
    pub created_at: Timestamp,
}

impl Enrollment {
    pub fn free(user_id: UserId, course_id: CourseId) -> Self {
        Self {
            id: EnrollmentId::new(),
            user_id,
            course_id,
            source: EnrollmentSource::Free,
            payment_external_id: None,
            created_at: Timestamp::now(),
        }
    }

    pub fn purchased(
        user_id: UserId,
        course_id: CourseId,
        payment_external_id: impl Into<String>,
    ) -> Self {
        Self {
            id: EnrollmentId::new(),
            user_id,
            course_id,
            source: EnrollmentSource::Purchase,
            payment_external_id: Some(payment_external_id.into()),
            created_at: Timestamp::now(),
        }
    }
}
