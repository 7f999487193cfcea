//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Identity provider and bearer token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Identity provider base URL
    pub provider_url: String,

    /// Public (anon) API key for sign-up and code exchange
    pub anon_key: String,

    /// Service-role key, used to delete identities during compensation
    pub service_role_key: String,

    /// HS256 secret for access tokens
    pub jwt_secret: String,

    /// Expected audience for tokens
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// In production, requires HTTPS for the provider URL.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.provider_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__PROVIDER_URL"));
        }
        if self.anon_key.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ANON_KEY"));
        }
        if self.service_role_key.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SERVICE_ROLE_KEY"));
        }
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if !self.provider_url.starts_with("http://") && !self.provider_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidUrl("AUTH__PROVIDER_URL"));
        }
        if *environment == Environment::Production && !self.provider_url.starts_with("https://") {
            return Err(ValidationError::UrlMustBeHttps("AUTH__PROVIDER_URL"));
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider_url: String::new(),
            anon_key: String::new(),
            service_role_key: String::new(),
            jwt_secret: String::new(),
            jwt_audience: default_jwt_audience(),
        }
    }
}

fn default_jwt_audience() -> String {
    "authenticated".to_string()
}
