//! `UserRepository` for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::{corrupt, expect_updated, read_error, write_error, PostgresEntitlementStore};
use crate::domain::account::User;
use crate::domain::foundation::{DomainError, Timestamp, UserId, UserRole};
use crate::ports::UserRepository;

/// Database row representation of a user.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    external_id: String,
    email: String,
    display_name: String,
    role: String,
    locale: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: UserRole = row.role.parse().map_err(|_| corrupt("role", &row.role))?;

        Ok(User {
            id: UserId::from_uuid(row.id),
            external_id: row.external_id,
            email: row.email,
            display_name: row.display_name,
            role,
            locale: row.locale,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT id, external_id, email, display_name, role, locale, created_at, updated_at
    FROM users
"#;

#[async_trait]
impl UserRepository for PostgresEntitlementStore {
    async fn insert_user(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, external_id, email, display_name, role, locale, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(&user.locale)
        .bind(user.created_at.as_datetime())
        .bind(user.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to insert user", e))?;

        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                display_name = $3,
                role = $4,
                locale = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(&user.locale)
        .bind(user.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("Failed to update user", e))?;

        expect_updated(result, "User")
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("Failed to fetch user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{} WHERE external_id = $1", SELECT_USER))
                .bind(external_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| read_error("Failed to fetch user", e))?;

        row.map(User::try_from).transpose()
    }
}
