//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth, errors)
//! - `account` - Users and signup validation
//! - `billing` - Subscriptions, payments, enrollments and webhook handling
//! - `notification` - Best-effort user notifications

pub mod account;
pub mod billing;
pub mod foundation;
pub mod notification;
