//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool max_connections must be at least 1")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("{0} must use HTTPS in production")]
    UrlMustBeHttps(&'static str),

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid plan catalog key: {0} (expected <plan>_month or <plan>_year)")]
    InvalidPlanKey(String),

    #[error("Invalid Resend API key format")]
    InvalidResendKey,

    #[error("Invalid sender email address")]
    InvalidFromEmail,

    #[error("Sender name cannot contain '<', '>' or quotes")]
    InvalidSenderName,

    #[error("Invalid reply-to email address")]
    InvalidReplyTo,

    #[error("Notification queue capacity and attempts must be positive")]
    InvalidNotificationQueue,
}
