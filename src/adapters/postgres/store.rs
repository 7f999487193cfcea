//! PostgreSQL entitlement store.
//!
//! One pool-backed struct implements every persistence port; the per-port
//! impls live in sibling modules. Unique constraint violations are reported
//! as `ErrorCode::Conflict` so handlers can treat duplicates as no-ops;
//! foreign key violations as `ErrorCode::BadRequest`.

use sqlx::postgres::{PgPoolOptions, PgQueryResult};
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// PostgreSQL implementation of the `EntitlementStore` ports.
#[derive(Clone)]
pub struct PostgresEntitlementStore {
    pub(super) pool: PgPool,
}

impl PostgresEntitlementStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Opens a connection pool sized from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    tracing::info!(database = %config.redacted_url(), "Connecting to database");
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::database(format!("Failed to connect to database: {}", e)))
}

/// Applies pending migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database(format!("Migration failed: {}", e)))
}

/// Maps a failed write, turning unique violations into conflicts and
/// foreign key violations into unknown references.
pub(super) fn write_error(context: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            return DomainError::conflict(format!("{}: violates {}", context, constraint))
                .with_detail("constraint", constraint);
        }
        if db_err.is_foreign_key_violation() {
            let constraint = db_err.constraint().unwrap_or("foreign key");
            return DomainError::unknown_reference(format!(
                "{}: references a missing row ({})",
                context, constraint
            ))
            .with_detail("constraint", constraint);
        }
    }
    DomainError::database(format!("{}: {}", context, e))
}

pub(super) fn read_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

/// Fails with `NotFound` when an update touched no rows.
pub(super) fn expect_updated(result: PgQueryResult, entity: &str) -> Result<(), DomainError> {
    if result.rows_affected() == 0 {
        return Err(DomainError::new(
            ErrorCode::NotFound,
            format!("{} not found", entity),
        ));
    }
    Ok(())
}

/// Error for a stored value that no longer parses.
pub(super) fn corrupt(column: &str, value: &str) -> DomainError {
    DomainError::database(format!("Invalid {} value: {}", column, value))
}
