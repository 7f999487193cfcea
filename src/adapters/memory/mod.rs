//! In-memory adapters.
//!
//! Used by tests and for running the service locally without PostgreSQL.

mod entitlement_store;
mod webhook_event_repository;

pub use entitlement_store::InMemoryEntitlementStore;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
