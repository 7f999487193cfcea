//! Marketplace user aggregate.

use crate::domain::foundation::{Timestamp, UserId, UserRole};

/// Locale assigned when neither the signup form nor the identity provider
/// supplies one.
pub const DEFAULT_LOCALE: &str = "en";

/// A marketplace user.
///
/// Linked 1:1 to an identity provider account through `external_id`, which
/// never changes once set. Users are never hard-deleted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub locale: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Creates a regular user for a freshly created identity.
    pub fn register(
        external_id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
        locale: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: UserId::new(),
            external_id: external_id.into(),
            email: email.into(),
            display_name: display_name.into(),
            role: UserRole::User,
            locale: locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Copies non-blank identity provider values over the local ones.
    ///
    /// Returns true if anything changed.
    pub fn refresh_from_identity(
        &mut self,
        email: Option<&str>,
        display_name: Option<&str>,
        locale: Option<&str>,
    ) -> bool {
        let mut changed = false;
        changed |= replace_if_present(&mut self.email, email);
        changed |= replace_if_present(&mut self.display_name, display_name);
        changed |= replace_if_present(&mut self.locale, locale);
        if changed {
            self.updated_at = Timestamp::now();
        }
        changed
    }
}

fn replace_if_present(field: &mut String, value: Option<&str>) -> bool {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) if v != field.as_str() => {
            *field = v.to_string();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::register("ext-1", "ada@example.com", "Ada", None)
    }

    #[test]
    fn register_defaults_role_and_locale() {
        let user = user();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.locale, DEFAULT_LOCALE);
    }

    #[test]
    fn refresh_updates_changed_fields() {
        let mut user = user();
        let changed =
            user.refresh_from_identity(Some("ada@lovelace.dev"), Some("Ada L."), Some("fr"));

        assert!(changed);
        assert_eq!(user.email, "ada@lovelace.dev");
        assert_eq!(user.display_name, "Ada L.");
        assert_eq!(user.locale, "fr");
    }

    #[test]
    fn refresh_ignores_blank_and_identical_values() {
        let mut user = user();
        let changed = user.refresh_from_identity(Some("ada@example.com"), Some("  "), None);

        assert!(!changed);
        assert_eq!(user.display_name, "Ada");
    }
}
