//! HTTP handlers for account endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::response::{ApiError, ApiResponse};
use crate::application::{
    CompleteSignInCommand, CompleteSignInHandler, RegisterUserCommand, RegisterUserHandler,
};
use crate::ports::{AuthProvider, Notifier, UserRepository};

use super::dto::{CallbackQuery, RegisterRequest, SignInResponse, UserResponse};

/// Shared state for account endpoints.
#[derive(Clone)]
pub struct AccountAppState {
    pub auth_provider: Arc<dyn AuthProvider>,
    pub users: Arc<dyn UserRepository>,
    pub notifier: Arc<dyn Notifier>,
}

impl AccountAppState {
    pub fn register_handler(&self) -> RegisterUserHandler {
        RegisterUserHandler::new(
            self.auth_provider.clone(),
            self.users.clone(),
            self.notifier.clone(),
        )
    }

    pub fn sign_in_handler(&self) -> CompleteSignInHandler {
        CompleteSignInHandler::new(self.auth_provider.clone(), self.users.clone())
    }
}

/// POST /register - Create an account with email and password
pub async fn register(
    State(state): State<AccountAppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let user = state
        .register_handler()
        .handle(RegisterUserCommand {
            email: request.email,
            password: request.password,
            name: request.name,
            locale: request.locale,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(UserResponse::from(user)).with_message("Account created"),
    ))
}

/// GET /auth/callback?code=... - Exchange a sign-in code for a session
pub async fn auth_callback(
    State(state): State<AccountAppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .sign_in_handler()
        .handle(CompleteSignInCommand {
            code: query.code.unwrap_or_default(),
        })
        .await?;

    Ok(ApiResponse::ok(SignInResponse::from(result)))
}
