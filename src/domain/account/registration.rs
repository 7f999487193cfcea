//! Signup input validation.

use secrecy::SecretString;

use crate::domain::foundation::ValidationError;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validated signup input.
#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub name: String,
    pub locale: Option<String>,
}

impl Registration {
    /// Validates raw signup fields.
    ///
    /// Email is trimmed and lower-cased, name is trimmed, and a blank locale
    /// is treated as absent.
    pub fn try_new(
        email: &str,
        password: String,
        name: &str,
        locale: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::too_short("password", MIN_PASSWORD_LENGTH));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        let locale = match locale.map(str::trim).filter(|l| !l.is_empty()) {
            Some(l) => Some(validate_locale(l)?),
            None => None,
        };

        Ok(Self {
            email,
            password: SecretString::new(password),
            name: name.to_string(),
            locale,
        })
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::empty_field("email"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ValidationError::invalid_format("email", "missing @ symbol"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::invalid_format("email", "malformed address"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::invalid_format("email", "invalid domain"));
    }

    Ok(())
}

/// Accepts `ll` or `ll-CC` style tags.
fn validate_locale(locale: &str) -> Result<String, ValidationError> {
    let valid = match locale.split_once('-') {
        None => locale.len() == 2 && locale.chars().all(|c| c.is_ascii_alphabetic()),
        Some((lang, region)) => {
            lang.len() == 2
                && region.len() == 2
                && lang.chars().all(|c| c.is_ascii_alphabetic())
                && region.chars().all(|c| c.is_ascii_alphabetic())
        }
    };

    if valid {
        Ok(locale.to_string())
    } else {
        Err(ValidationError::invalid_format(
            "locale",
            "expected a language tag like 'en' or 'pt-BR'",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn register(email: &str, password: &str, name: &str) -> Result<Registration, ValidationError> {
        Registration::try_new(email, password.to_string(), name, None)
    }

    #[test]
    fn valid_input_is_normalized() {
        let reg = Registration::try_new(
            "  Ada@Example.COM ",
            "correct horse".to_string(),
            " Ada ",
            Some("pt-BR"),
        )
        .unwrap();

        assert_eq!(reg.email, "ada@example.com");
        assert_eq!(reg.name, "Ada");
        assert_eq!(reg.locale.as_deref(), Some("pt-BR"));
        assert_eq!(reg.password.expose_secret(), "correct horse");
    }

    #[test]
    fn email_without_at_is_rejected() {
        let err = register("ada.example.com", "password123", "Ada").unwrap_err();
        assert_eq!(err.field(), "email");
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(register("ada@localhost", "password123", "Ada").is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let err = register("ada@example.com", "short", "Ada").unwrap_err();
        assert_eq!(err, ValidationError::too_short("password", MIN_PASSWORD_LENGTH));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = register("ada@example.com", "password123", "   ").unwrap_err();
        assert_eq!(err, ValidationError::empty_field("name"));
    }

    #[test]
    fn malformed_locale_is_rejected() {
        let err =
            Registration::try_new("ada@example.com", "password123".into(), "Ada", Some("english"))
                .unwrap_err();
        assert_eq!(err.field(), "locale");
    }

    #[test]
    fn blank_locale_is_absent() {
        let reg =
            Registration::try_new("ada@example.com", "password123".into(), "Ada", Some(" "))
                .unwrap();
        assert!(reg.locale.is_none());
    }
}
