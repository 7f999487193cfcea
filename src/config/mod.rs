//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `COURSE_MARKET` prefix
//! and nested values are separated by a double underscore.
//!
//! # Example
//!
//! ```no_run
//! use course_market::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod email;
mod error;
mod notifications;
mod payment;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use notifications::NotificationsConfig;
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Identity provider and access token settings
    pub auth: AuthConfig,

    /// Payment provider, webhook secret and plan catalog
    pub payment: PaymentConfig,

    /// Email configuration (Resend)
    pub email: EmailConfig,

    /// Background notification queue
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `COURSE_MARKET` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `COURSE_MARKET__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COURSE_MARKET__PAYMENT__WEBHOOK_SECRET=...` -> `payment.webhook_secret`
    /// - `COURSE_MARKET__PAYMENT__PLANS__PRO_MONTH=...` -> `payment.plans["pro_month"]`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COURSE_MARKET")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.email.validate()?;
        self.notifications.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
