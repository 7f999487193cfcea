//! CheckoutCourseHandler - Enrolls in free courses or starts a hosted checkout.
//!
//! Free courses are granted immediately. Paid courses redirect to the
//! payment provider; the enrollment is created by the payment ledger once
//! the provider confirms payment.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Coupon, Course, Enrollment, EventMetadata};
use crate::domain::foundation::{EnrollmentId, Timestamp, UserId};
use crate::domain::notification::Notification;
use crate::ports::{
    CatalogReader, CreateCheckoutRequest, EnrollmentRepository, Notifier, PaymentProvider,
};

/// Command to check out a course.
#[derive(Debug, Clone)]
pub struct CheckoutCourseCommand {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub course_slug: String,
    pub coupon_code: Option<String>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutCourseResult {
    /// Free course, enrollment created.
    Enrolled { enrollment_id: EnrollmentId },
    /// Paid course, customer must complete payment at this URL.
    Redirect { checkout_url: String },
}

/// Handler for course checkout.
pub struct CheckoutCourseHandler {
    catalog: Arc<dyn CatalogReader>,
    enrollments: Arc<dyn EnrollmentRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    notifier: Arc<dyn Notifier>,
    success_url: String,
}

impl CheckoutCourseHandler {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        enrollments: Arc<dyn EnrollmentRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn Notifier>,
        success_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            enrollments,
            payment_provider,
            notifier,
            success_url: success_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CheckoutCourseCommand,
    ) -> Result<CheckoutCourseResult, BillingError> {
        // 1. Course must exist and be published
        let course = self
            .catalog
            .find_course_by_slug(&cmd.course_slug)
            .await?
            .ok_or_else(|| BillingError::course_not_found(&cmd.course_slug))?;

        if !course.published {
            return Err(BillingError::course_unpublished(&course.slug));
        }

        // 2. Fast path for existing enrollments; the store has the final say
        if self
            .enrollments
            .find_enrollment(&cmd.user_id, &course.id)
            .await?
            .is_some()
        {
            return Err(BillingError::already_enrolled(&course.slug));
        }

        // 3. Free courses are granted directly
        if course.is_free() {
            return self.enroll_free(&cmd, &course).await;
        }

        // 4. Paid courses go through the provider
        self.start_checkout(&cmd, &course).await
    }

    async fn enroll_free(
        &self,
        cmd: &CheckoutCourseCommand,
        course: &Course,
    ) -> Result<CheckoutCourseResult, BillingError> {
        let enrollment = Enrollment::free(cmd.user_id, course.id);

        match self.enrollments.insert_enrollment(&enrollment).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => return Err(BillingError::already_enrolled(&course.slug)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            user_id = %cmd.user_id,
            course = %course.slug,
            enrollment_id = %enrollment.id,
            "Free enrollment created"
        );

        self.notifier.notify(Notification::EnrollmentConfirmed {
            to: cmd.email.clone(),
            name: cmd.name.clone(),
            course_title: course.title.clone(),
        });

        Ok(CheckoutCourseResult::Enrolled {
            enrollment_id: enrollment.id,
        })
    }

    async fn start_checkout(
        &self,
        cmd: &CheckoutCourseCommand,
        course: &Course,
    ) -> Result<CheckoutCourseResult, BillingError> {
        let product_id = course
            .checkout_product()
            .ok_or_else(|| BillingError::missing_product_reference(&course.slug))?
            .to_string();

        let discount_id = match cmd.coupon_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => self.resolve_coupon(code, course).await?,
            _ => None,
        };

        let request = CreateCheckoutRequest {
            product_id,
            customer_email: Some(cmd.email.clone()),
            success_url: self.success_url.clone(),
            metadata: EventMetadata::course_purchase(
                cmd.user_id.to_string(),
                course.id.to_string(),
                course.slug.clone(),
            ),
            discount_id,
        };

        let session = self
            .payment_provider
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, course = %course.slug, "Checkout creation failed");
                BillingError::provider(e.to_string())
            })?;

        tracing::info!(
            user_id = %cmd.user_id,
            course = %course.slug,
            checkout_id = %session.id,
            "Checkout session created"
        );

        Ok(CheckoutCourseResult::Redirect {
            checkout_url: session.url,
        })
    }

    /// Validates a coupon and returns its provider discount id.
    async fn resolve_coupon(
        &self,
        code: &str,
        course: &Course,
    ) -> Result<Option<String>, BillingError> {
        let normalized = Coupon::normalize_code(code);
        let coupon = self
            .catalog
            .find_coupon(&normalized)
            .await?
            .ok_or_else(|| BillingError::invalid_coupon(&normalized, "not found"))?;

        coupon
            .check_usable_for(course, Timestamp::now())
            .map_err(|rejection| BillingError::invalid_coupon(&normalized, rejection.message()))?;

        Ok(coupon.provider_discount_id)
    }
}
