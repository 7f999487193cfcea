//! Read-only catalog types consulted during checkout.
//!
//! Courses and coupons are authored elsewhere; checkout only needs to know
//! whether a course can be bought, how much it costs, and whether a coupon
//! applies to it.

use crate::domain::foundation::{CourseId, Timestamp};
use serde::{Deserialize, Serialize};

/// A catalog course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub slug: String,
    pub title: String,
    pub published: bool,
    /// Price in minor currency units. Zero means the course is free.
    pub price: i64,
    pub currency: String,
    /// Payment provider product used for hosted checkout of paid courses.
    pub product_ref: Option<String>,
}

impl Course {
    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    /// Product reference, ignoring blank values.
    pub fn checkout_product(&self) -> Option<&str> {
        self.product_ref
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A discount code.
///
/// Codes are compared case-insensitively and stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    /// When set, the coupon only applies to this course.
    pub course_id: Option<CourseId>,
    pub expires_at: Option<Timestamp>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    /// Matching discount on the payment provider side.
    pub provider_discount_id: Option<String>,
}

/// Why a coupon cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    Expired,
    Exhausted,
    WrongCourse,
}

impl CouponRejection {
    pub fn message(&self) -> &'static str {
        match self {
            CouponRejection::Expired => "Coupon has expired",
            CouponRejection::Exhausted => "Coupon usage limit reached",
            CouponRejection::WrongCourse => "Coupon does not apply to this course",
        }
    }
}

impl Coupon {
    /// Normalizes user input to the stored code form.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Checks expiry, usage cap and course scope.
    pub fn check_usable_for(&self, course: &Course, now: Timestamp) -> Result<(), CouponRejection> {
        if let Some(expires_at) = self.expires_at {
            if !now.is_before(&expires_at) {
                return Err(CouponRejection::Expired);
            }
        }

        if let Some(max_uses) = self.max_uses {
            if self.used_count >= max_uses {
                return Err(CouponRejection::Exhausted);
            }
        }

        match self.course_id {
            Some(scope) if scope != course.id => Err(CouponRejection::WrongCourse),
            _ => Ok(()),
        }
    }

    pub fn is_usable_for(&self, course: &Course, now: Timestamp) -> bool {
        self.check_usable_for(course, now).is_ok()
    }
}
