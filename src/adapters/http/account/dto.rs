//! HTTP DTOs for account endpoints.

use serde::{Deserialize, Serialize};

use crate::application::CompleteSignInResult;
use crate::domain::account::User;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Query string of `GET /auth/callback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub locale: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.display_name,
            role: user.role.as_str().to_string(),
            locale: user.locale,
        }
    }
}

/// Session handed back after a successful sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl From<CompleteSignInResult> for SignInResponse {
    fn from(result: CompleteSignInResult) -> Self {
        Self {
            access_token: result.session.access_token,
            refresh_token: result.session.refresh_token,
            expires_in: result.session.expires_in,
            user: UserResponse::from(result.user),
        }
    }
}
