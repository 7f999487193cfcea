//! `EnrollmentRepository` for PostgreSQL.
//!
//! The `enrollments_user_course_key` constraint decides concurrent duplicate
//! enrollments; the loser gets a conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::{corrupt, read_error, write_error, PostgresEntitlementStore};
use crate::domain::billing::{Enrollment, EnrollmentSource};
use crate::domain::foundation::{CourseId, DomainError, EnrollmentId, Timestamp, UserId};
use crate::ports::EnrollmentRepository;

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    source: String,
    payment_external_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = DomainError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        let source =
            EnrollmentSource::parse(&row.source).ok_or_else(|| corrupt("source", &row.source))?;

        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            course_id: CourseId::from_uuid(row.course_id),
            source,
            payment_external_id: row.payment_external_id,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl EnrollmentRepository for PostgresEntitlementStore {
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (
                id, user_id, course_id, source, payment_external_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.user_id.as_uuid())
        .bind(enrollment.course_id.as_uuid())
        .bind(enrollment.source.as_str())
        .bind(&enrollment.payment_external_id)
        .bind(enrollment.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to insert enrollment", e))?;

        Ok(())
    }

    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, course_id, source, payment_external_id, created_at
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch enrollment", e))?;

        row.map(Enrollment::try_from).transpose()
    }
}
