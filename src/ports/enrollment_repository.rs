//! Enrollment repository port.
//!
//! The (user, course) pair is unique. Callers may check for an existing
//! enrollment first, but only the store's constraint is authoritative: two
//! concurrent inserts for the same pair must result in exactly one row and
//! one `Conflict`.

use async_trait::async_trait;

use crate::domain::billing::Enrollment;
use crate::domain::foundation::{CourseId, DomainError, UserId};

/// Persistence for course enrollments.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert an enrollment.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the user is already enrolled in the course
    /// - `DatabaseError` on persistence failure
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), DomainError>;

    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError>;
}
