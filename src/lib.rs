//! Course Market - payment and subscription reconciliation core
//!
//! Turns payment provider webhooks, checkout requests and sign-ups into
//! consistent local state: subscriptions, payments, course enrollments and
//! user accounts.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
