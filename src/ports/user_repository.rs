//! User repository port.

use async_trait::async_trait;

use crate::domain::account::User;
use crate::domain::foundation::{DomainError, UserId};

/// Persistence for marketplace users.
///
/// Implementations must enforce uniqueness of `external_id` and report a
/// violation as `ErrorCode::Conflict`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), DomainError>;

    /// Persist profile changes (email, display name, locale).
    async fn update_user(&self, user: &User) -> Result<(), DomainError>;

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, DomainError>;
}
