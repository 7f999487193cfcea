//! `CatalogReader` for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::{read_error, PostgresEntitlementStore};
use crate::domain::billing::{Coupon, Course};
use crate::domain::foundation::{CourseId, DomainError, Timestamp};
use crate::ports::CatalogReader;

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    slug: String,
    title: String,
    published: bool,
    price: i64,
    currency: String,
    product_ref: Option<String>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: CourseId::from_uuid(row.id),
            slug: row.slug,
            title: row.title,
            published: row.published,
            price: row.price,
            currency: row.currency,
            product_ref: row.product_ref,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    code: String,
    course_id: Option<Uuid>,
    expires_at: Option<DateTime<Utc>>,
    max_uses: Option<i32>,
    used_count: i32,
    provider_discount_id: Option<String>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Coupon {
            code: row.code,
            course_id: row.course_id.map(CourseId::from_uuid),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            max_uses: row.max_uses,
            used_count: row.used_count,
            provider_discount_id: row.provider_discount_id,
        }
    }
}

const SELECT_COURSE: &str = r#"
    SELECT id, slug, title, published, price, currency, product_ref
    FROM courses
"#;

#[async_trait]
impl CatalogReader for PostgresEntitlementStore {
    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(&format!("{} WHERE slug = $1", SELECT_COURSE))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("Failed to fetch course", e))?;

        Ok(row.map(Course::from))
    }

    async fn find_course_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COURSE))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("Failed to fetch course", e))?;

        Ok(row.map(Course::from))
    }

    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        let row: Option<CouponRow> = sqlx::query_as(
            r#"
            SELECT code, course_id, expires_at, max_uses, used_count, provider_discount_id
            FROM coupons
            WHERE code = $1
            "#,
        )
        .bind(Coupon::normalize_code(code))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("Failed to fetch coupon", e))?;

        Ok(row.map(Coupon::from))
    }
}
