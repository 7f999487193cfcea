//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that validates Bearer tokens and injects the
//!   local user into extensions
//! - `RequireAuth` - Extractor that requires authentication
//!
//! # Architecture
//!
//! The middleware uses the `SessionValidator` port to check the token and the
//! `UserRepository` port to resolve the token subject to a local user. Neither
//! depends on the identity provider implementation.
//!
//! ```text
//! Request → auth_middleware → validate token → find user by external id
//!                                      ↓
//!                              injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::response::ApiError;
use crate::domain::account::User;
use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::{SessionValidator, UserRepository};

/// Dependencies of the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn SessionValidator>,
    pub users: Arc<dyn UserRepository>,
}

impl AuthState {
    pub fn new(validator: Arc<dyn SessionValidator>, users: Arc<dyn UserRepository>) -> Self {
        Self { validator, users }
    }

    /// Validates a bearer token and resolves its local user.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let verified = self.validator.validate(token).await?;

        let user = self
            .users
            .find_user_by_external_id(&verified.external_id)
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        Ok(authenticated(user))
    }
}

fn authenticated(user: User) -> AuthenticatedUser {
    AuthenticatedUser::new(
        user.id,
        user.external_id,
        user.email,
        user.display_name,
        user.role,
    )
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware that validates Bearer tokens.
///
/// - no token: continues without a user; `RequireAuth` rejects later
/// - valid token for a known user: injects `AuthenticatedUser`
/// - invalid token or unknown user: 401
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return next.run(request).await;
    };

    match auth.authenticate(token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Bearer token rejected");
            ApiError::from(e).into_response()
        }
    }
}

/// Extractor that requires authentication.
///
/// Returns 401 unless `auth_middleware` injected a user.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
