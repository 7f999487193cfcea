//! Axum router configuration for account endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{auth_callback, register, AccountAppState};

/// Create the account router.
///
/// # Routes
/// - `POST /register` - Create an account
/// - `GET /auth/callback` - Complete a sign-in
pub fn account_routes() -> Router<AccountAppState> {
    Router::new()
        .route("/register", post(register))
        .route("/auth/callback", get(auth_callback))
}
