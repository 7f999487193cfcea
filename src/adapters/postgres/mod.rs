//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresEntitlementStore` - users, catalog, subscriptions, payments and
//!   enrollments
//! - `PostgresWebhookEventRepository` - processed webhook deliveries

mod catalog;
mod enrollments;
mod payments;
mod store;
mod subscriptions;
mod users;
mod webhook_events;

pub use store::{connect, run_migrations, PostgresEntitlementStore};
pub use webhook_events::PostgresWebhookEventRepository;
