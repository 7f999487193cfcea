//! Catalog reader port (read side).
//!
//! Courses and coupons are managed elsewhere; checkout only reads them.

use async_trait::async_trait;

use crate::domain::billing::{Coupon, Course};
use crate::domain::foundation::{CourseId, DomainError};

/// Read-only access to courses and coupons.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError>;

    async fn find_course_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// Look up a coupon by its normalized (upper-case) code.
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError>;
}
