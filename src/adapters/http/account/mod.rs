//! HTTP adapter for account endpoints.
//!
//! - `POST /register` - Email/password registration
//! - `GET /auth/callback` - Sign-in callback (authorization code exchange)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::AccountAppState;
pub use routes::account_routes;
