//! Resend email adapter.
//!
//! Implements `NotificationSender` over the Resend HTTP API. Bodies are plain
//! text; the sender header comes from configuration.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::notification::Notification;
use crate::ports::NotificationSender;

const DEFAULT_API_BASE_URL: &str = "https://api.resend.com";

/// Resend API configuration.
#[derive(Clone)]
pub struct ResendConfig {
    api_key: SecretString,
    /// Full `From` header, e.g. `Courses <hello@example.com>`.
    from: String,
    reply_to: Option<String>,
    api_base_url: String,
}

impl ResendConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            from: from.into(),
            reply_to: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: String,
    text: String,
}

/// Email sender backed by Resend.
pub struct ResendEmailSender {
    config: ResendConfig,
    http_client: reqwest::Client,
}

impl ResendEmailSender {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn body<'a>(&'a self, notification: &'a Notification) -> SendEmailBody<'a> {
        SendEmailBody {
            from: &self.config.from,
            to: [notification.recipient()],
            reply_to: self.config.reply_to.as_deref(),
            subject: notification.subject(),
            text: notification.text_body(),
        }
    }
}

#[async_trait]
impl NotificationSender for ResendEmailSender {
    async fn send(&self, notification: &Notification) -> Result<(), DomainError> {
        let url = format!("{}/emails", self.config.api_base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.body(notification))
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::ExternalServiceError,
                    format!("Email request failed: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("Email provider returned {}: {}", status, detail),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_uses_notification_content() {
        let sender = ResendEmailSender::new(ResendConfig::new("re_test", "Courses <hi@example.com>"));
        let notification = Notification::EnrollmentConfirmed {
            to: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            course_title: "Rust 101".to_string(),
        };

        let body = serde_json::to_value(sender.body(&notification)).unwrap();

        assert_eq!(body["from"], "Courses <hi@example.com>");
        assert_eq!(body["to"][0], "ada@example.com");
        assert_eq!(body["subject"], "You're enrolled in Rust 101");
        assert!(body["text"].as_str().unwrap().contains("Rust 101"));
        assert!(body.get("reply_to").is_none());
    }

    #[test]
    fn reply_to_is_sent_when_configured() {
        let sender = ResendEmailSender::new(
            ResendConfig::new("re_test", "Courses <hi@example.com>")
                .with_reply_to("support@example.com"),
        );
        let notification = Notification::Welcome {
            to: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        };

        let body = serde_json::to_value(sender.body(&notification)).unwrap();

        assert_eq!(body["reply_to"], "support@example.com");
    }
}
