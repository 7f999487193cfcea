//! HTTP identity provider adapter.
//!
//! Implements `AuthProvider` against a GoTrue-style auth REST API:
//!
//! | Operation | Request | Key |
//! |-----------|---------|-----|
//! | `sign_up` | `POST /auth/v1/signup` | anon |
//! | `exchange_code` | `POST /auth/v1/token?grant_type=pkce` | anon |
//! | `delete_user` | `DELETE /auth/v1/admin/users/{id}` | service role |
//!
//! Display name and locale travel as user metadata.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::account::Registration;
use crate::ports::{AuthProvider, ExternalIdentity, IdentityError, IdentitySession};

/// Configuration for the identity provider API.
#[derive(Clone)]
pub struct AuthApiConfig {
    base_url: String,
    anon_key: SecretString,
    service_role_key: SecretString,
}

impl AuthApiConfig {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: SecretString::new(anon_key.into()),
            service_role_key: SecretString::new(service_role_key.into()),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

#[derive(Debug, Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: UserMetadata,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing)]
    full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl From<ApiUser> for ExternalIdentity {
    fn from(user: ApiUser) -> Self {
        let UserMetadata {
            name,
            full_name,
            locale,
        } = user.user_metadata;
        Self {
            id: user.id,
            email: user.email,
            name: name.or(full_name),
            locale,
        }
    }
}

/// Signup returns the bare user, or `{user, session}` when autoconfirm is on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    WithSession { user: ApiUser },
    Bare(ApiUser),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
    user: ApiUser,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ApiErrorBody {
    fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| "request rejected".to_string())
    }
}

/// Identity provider over HTTP.
pub struct HttpAuthProvider {
    config: AuthApiConfig,
    http_client: reqwest::Client,
}

impl HttpAuthProvider {
    pub fn new(config: AuthApiConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn read_error(response: reqwest::Response) -> (reqwest::StatusCode, ApiErrorBody) {
        let status = response.status();
        let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
        (status, body)
    }
}

fn unavailable(e: impl std::fmt::Display) -> IdentityError {
    IdentityError::Unavailable(e.to_string())
}

/// Map a failed signup response onto the port's error contract.
fn sign_up_error(status: reqwest::StatusCode, body: &ApiErrorBody) -> IdentityError {
    let code = body.error_code.as_deref().unwrap_or_default();
    let message = body.message();

    if matches!(code, "user_already_exists" | "email_exists")
        || message.to_lowercase().contains("already registered")
    {
        return IdentityError::EmailTaken;
    }
    if status.is_client_error() {
        return IdentityError::Rejected(message);
    }
    IdentityError::Unavailable(format!("{}: {}", status, message))
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn sign_up(&self, registration: &Registration) -> Result<ExternalIdentity, IdentityError> {
        let body = SignUpBody {
            email: &registration.email,
            password: registration.password.expose_secret(),
            data: UserMetadata {
                name: Some(registration.name.clone()),
                full_name: None,
                locale: registration.locale.clone(),
            },
        };

        let response = self
            .http_client
            .post(self.config.endpoint("signup"))
            .header("apikey", self.config.anon_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            let (status, body) = Self::read_error(response).await;
            tracing::debug!(status = %status, error_code = ?body.error_code, "Sign-up rejected");
            return Err(sign_up_error(status, &body));
        }

        let user = match response.json::<SignUpResponse>().await.map_err(unavailable)? {
            SignUpResponse::WithSession { user } => user,
            SignUpResponse::Bare(user) => user,
        };
        Ok(user.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<IdentitySession, IdentityError> {
        let response = self
            .http_client
            .post(self.config.endpoint("token?grant_type=pkce"))
            .header("apikey", self.config.anon_key.expose_secret())
            .json(&serde_json::json!({ "auth_code": code }))
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if status.is_client_error() {
            return Err(IdentityError::InvalidCode);
        }
        if !status.is_success() {
            let (status, body) = Self::read_error(response).await;
            return Err(IdentityError::Unavailable(format!("{}: {}", status, body.message())));
        }

        let token: TokenResponse = response.json().await.map_err(unavailable)?;
        Ok(IdentitySession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            identity: token.user.into(),
        })
    }

    async fn delete_user(&self, external_id: &str) -> Result<(), IdentityError> {
        let key = self.config.service_role_key.expose_secret();
        let response = self
            .http_client
            .delete(self.config.endpoint(&format!("admin/users/{}", external_id)))
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            s if s.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(IdentityError::NotFound),
            _ => {
                let (status, body) = Self::read_error(response).await;
                Err(IdentityError::Unavailable(format!("{}: {}", status, body.message())))
            }
        }
    }
}
