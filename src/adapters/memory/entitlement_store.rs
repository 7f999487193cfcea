//! In-memory entitlement store.
//!
//! Implements every persistence port with the same uniqueness and foreign
//! key rules as the PostgreSQL schema, so handler tests exercise real
//! conflict and missing-reference behavior. Also usable for local
//! development without a database.
//!
//! Test hooks:
//! - `fail_user_inserts` makes `insert_user` fail with a database error
//! - `write_count` counts successful inserts and updates

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::account::User;
use crate::domain::billing::{Coupon, Course, Enrollment, Payment, Subscription};
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, PaymentId, SubscriptionId, UserId,
};
use crate::ports::{
    CatalogReader, EnrollmentRepository, PaymentRepository, SubscriptionRepository,
    UserRepository,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    payments: HashMap<PaymentId, Payment>,
    enrollments: HashMap<(UserId, CourseId), Enrollment>,
    courses: HashMap<CourseId, Course>,
    coupons: HashMap<String, Coupon>,
}

/// In-memory implementation of the entitlement store ports.
#[derive(Default)]
pub struct InMemoryEntitlementStore {
    state: RwLock<State>,
    fail_user_inserts: AtomicBool,
    writes: AtomicU64,
}

impl InMemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course to the catalog.
    pub async fn add_course(&self, course: Course) {
        self.state.write().await.courses.insert(course.id, course);
    }

    /// Adds a coupon to the catalog.
    pub async fn add_coupon(&self, coupon: Coupon) {
        let code = Coupon::normalize_code(&coupon.code);
        self.state.write().await.coupons.insert(code, coupon);
    }

    /// Makes subsequent `insert_user` calls fail with a database error.
    pub fn fail_user_inserts(&self, fail: bool) {
        self.fail_user_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of successful inserts and updates so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.values().cloned().collect()
    }

    pub async fn subscriptions(&self) -> Vec<Subscription> {
        self.state.read().await.subscriptions.values().cloned().collect()
    }

    pub async fn payments(&self) -> Vec<Payment> {
        self.state.read().await.payments.values().cloned().collect()
    }

    pub async fn enrollments(&self) -> Vec<Enrollment> {
        self.state.read().await.enrollments.values().cloned().collect()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn not_found(entity: &str) -> DomainError {
    DomainError::new(ErrorCode::NotFound, format!("{} not found", entity))
}

impl State {
    fn require_user(&self, id: &UserId) -> Result<(), DomainError> {
        if !self.users.contains_key(id) {
            return Err(DomainError::unknown_reference(format!("User {} does not exist", id)));
        }
        Ok(())
    }

    fn require_course(&self, id: &CourseId) -> Result<(), DomainError> {
        if !self.courses.contains_key(id) {
            return Err(DomainError::unknown_reference(format!("Course {} does not exist", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryEntitlementStore {
    async fn insert_user(&self, user: &User) -> Result<(), DomainError> {
        if self.fail_user_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated user insert failure"));
        }

        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.id == user.id || u.external_id == user.external_id)
        {
            return Err(DomainError::conflict("User already exists"));
        }
        state.users.insert(user.id, user.clone());
        self.record_write();
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let existing = state.users.get_mut(&user.id).ok_or_else(|| not_found("User"))?;
        *existing = user.clone();
        self.record_write();
        Ok(())
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn find_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.external_id == external_id)
            .cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryEntitlementStore {
    async fn insert_subscription(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.require_user(&subscription.user_id)?;
        if state
            .subscriptions
            .values()
            .any(|s| s.external_id == subscription.external_id)
        {
            return Err(DomainError::conflict("Subscription already exists"));
        }
        state
            .subscriptions
            .insert(subscription.id, subscription.clone());
        self.record_write();
        Ok(())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let existing = state
            .subscriptions
            .get_mut(&subscription.id)
            .ok_or_else(|| not_found("Subscription"))?;
        *existing = subscription.clone();
        self.record_write();
        Ok(())
    }

    async fn find_subscription_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .values()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn find_current_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| &s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryEntitlementStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.require_user(&payment.user_id)?;
        if state
            .payments
            .values()
            .any(|p| p.external_id == payment.external_id)
        {
            return Err(DomainError::conflict("Payment already recorded"));
        }
        state.payments.insert(payment.id, payment.clone());
        self.record_write();
        Ok(())
    }

    async fn update_payment(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let existing = state
            .payments
            .get_mut(&payment.id)
            .ok_or_else(|| not_found("Payment"))?;
        *existing = payment.clone();
        self.record_write();
        Ok(())
    }

    async fn find_payment_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .payments
            .values()
            .find(|p| p.external_id == external_id)
            .cloned())
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEntitlementStore {
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.require_user(&enrollment.user_id)?;
        state.require_course(&enrollment.course_id)?;
        let key = (enrollment.user_id, enrollment.course_id);
        if state.enrollments.contains_key(&key) {
            return Err(DomainError::conflict("Already enrolled"));
        }
        state.enrollments.insert(key, enrollment.clone());
        self.record_write();
        Ok(())
    }

    async fn find_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .enrollments
            .get(&(*user_id, *course_id))
            .cloned())
    }
}

#[async_trait]
impl CatalogReader for InMemoryEntitlementStore {
    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .courses
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_course_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.state.read().await.courses.get(id).cloned())
    }

    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .coupons
            .get(&Coupon::normalize_code(code))
            .cloned())
    }
}
