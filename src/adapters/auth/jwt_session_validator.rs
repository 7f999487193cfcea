//! JWT session validator.
//!
//! Validates access tokens issued by the identity provider. Tokens are HS256
//! JWTs signed with the project's shared JWT secret.
//!
//! # Security
//!
//! - **Signature**: HS256 with the shared secret
//! - **Audience (aud)**: Must contain the configured audience
//! - **Expiry (exp)**: Must be in the future
//!
//! # Example
//!
//! ```ignore
//! let validator = JwtSessionValidator::new(JwtConfig::new(secret, "authenticated"));
//! let token = validator.validate("eyJ...").await?;
//! ```

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, VerifiedToken};
use crate::ports::SessionValidator;

/// Configuration for JWT validation.
#[derive(Clone)]
pub struct JwtConfig {
    secret: SecretString,
    /// Expected audience claim.
    pub audience: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            audience: audience.into(),
        }
    }
}

/// Claims we read from access tokens.
#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
}

/// HS256 session validator.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidAudience => {
                        tracing::warn!("Invalid audience in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!(error = %e, "Token validation failed");
                        AuthError::InvalidToken
                    }
                }
            },
        )?;

        if data.claims.sub.trim().is_empty() {
            tracing::warn!("Token has empty subject");
            return Err(AuthError::InvalidToken);
        }

        Ok(VerifiedToken {
            external_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-jwt-secret-with-enough-length";

    fn validator() -> JwtSessionValidator {
        JwtSessionValidator::new(JwtConfig::new(SECRET, "authenticated"))
    }

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let jwt = token(
            json!({"sub": "ext-1", "aud": "authenticated", "exp": future_exp(), "email": "a@b.co"}),
            SECRET,
        );

        let verified = validator().validate(&jwt).await.unwrap();

        assert_eq!(verified.external_id, "ext-1");
        assert_eq!(verified.email.as_deref(), Some("a@b.co"));
    }

    #[tokio::test]
    async fn rejects_wrong_secret() {
        let jwt = token(
            json!({"sub": "ext-1", "aud": "authenticated", "exp": future_exp()}),
            "another-secret-entirely",
        );

        assert_eq!(validator().validate(&jwt).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn rejects_wrong_audience() {
        let jwt = token(
            json!({"sub": "ext-1", "aud": "someone-else", "exp": future_exp()}),
            SECRET,
        );

        assert_eq!(validator().validate(&jwt).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn reports_expired_tokens() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        let jwt = token(json!({"sub": "ext-1", "aud": "authenticated", "exp": exp}), SECRET);

        assert_eq!(validator().validate(&jwt).await, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        assert_eq!(
            validator().validate("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        );
    }
}
