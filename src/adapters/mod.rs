//! Adapters - Implementations of ports for external systems.
//!
//! - `auth` - identity provider REST client and JWT session validation
//! - `http` - axum HTTP surface
//! - `memory` - in-memory stores for tests and local runs
//! - `notification` - background email delivery
//! - `payment` - payment provider REST client
//! - `postgres` - sqlx-backed stores

pub mod auth;
pub mod http;
pub mod memory;
pub mod notification;
pub mod payment;
pub mod postgres;
