//! Transactional email settings.
//!
//! Welcome, enrollment and subscription emails go out through Resend from a
//! single sender identity. Replies can be routed to a support inbox.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key (`re_...`)
    pub resend_api_key: String,

    #[serde(default = "default_sender_address")]
    pub sender_address: String,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// `Reply-To` for learner replies; unset means replies go to the sender
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl EmailConfig {
    /// `From` header value, `Name <address>`.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.sender_name.trim(), self.sender_address)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL__RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !is_mailbox(&self.sender_address) {
            return Err(ValidationError::InvalidFromEmail);
        }
        if self.sender_name.contains(['<', '>', '"']) {
            return Err(ValidationError::InvalidSenderName);
        }
        if let Some(reply_to) = &self.reply_to {
            if !is_mailbox(reply_to) {
                return Err(ValidationError::InvalidReplyTo);
            }
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            sender_address: default_sender_address(),
            sender_name: default_sender_name(),
            reply_to: None,
        }
    }
}

/// `local@domain.tld`, no whitespace.
fn is_mailbox(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn default_sender_address() -> String {
    "hello@courses.example".to_string()
}

fn default_sender_name() -> String {
    "Course Market".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> EmailConfig {
        EmailConfig {
            resend_api_key: "re_live_123".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn sender_header_combines_name_and_address() {
        assert_eq!(configured().sender(), "Course Market <hello@courses.example>");
    }

    #[test]
    fn defaults_are_valid_once_key_is_set() {
        assert!(configured().validate().is_ok());
        assert!(matches!(
            EmailConfig::default().validate(),
            Err(ValidationError::MissingRequired("EMAIL__RESEND_API_KEY"))
        ));
    }

    #[test]
    fn api_key_must_be_a_resend_key() {
        let config = EmailConfig {
            resend_api_key: "sk_live_123".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidResendKey)));
    }

    #[test]
    fn sender_address_and_reply_to_must_be_mailboxes() {
        for bad in ["courses.example", "@courses.example", "hello@localhost", "a b@x.io"] {
            let config = EmailConfig {
                sender_address: bad.to_string(),
                ..configured()
            };
            assert!(
                matches!(config.validate(), Err(ValidationError::InvalidFromEmail)),
                "{} should be rejected",
                bad
            );
        }

        let reply = EmailConfig {
            reply_to: Some("support".to_string()),
            ..configured()
        };
        assert!(matches!(reply.validate(), Err(ValidationError::InvalidReplyTo)));

        let support = EmailConfig {
            reply_to: Some("support@courses.example".to_string()),
            ..configured()
        };
        assert!(support.validate().is_ok());
    }

    #[test]
    fn sender_name_cannot_break_the_header() {
        let config = EmailConfig {
            sender_name: "Evil <x@y.z>".to_string(),
            ..configured()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidSenderName)));
    }
}
