//! HTTP adapter for billing endpoints.
//!
//! - `POST /webhook` - Payment provider webhooks (signature verified)
//! - `POST /checkout/{courseSlug}` - Free enrollment or hosted checkout
//! - `GET /subscription` - Current subscription
//! - `POST /subscription` - Cancel, resume or change plan

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::{billing_routes, webhook_routes};
