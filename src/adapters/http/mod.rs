//! HTTP adapter - axum routers, handlers and the response envelope.
//!
//! - `billing` - webhook, checkout and subscription endpoints
//! - `account` - registration and sign-in callback
//! - `middleware` - bearer token authentication
//! - `response` - success/error envelope and error mapping

pub mod account;
pub mod billing;
pub mod middleware;
pub mod response;
mod router;

pub use response::{ApiError, ApiResponse};
pub use router::{api_router, app_router, AppState, BillingSettings, Collaborators, HttpSettings};
