//! Transactional notifications.
//!
//! Notifications are best-effort side effects of account and billing
//! operations. Template rendering lives outside this crate; each variant only
//! carries what the message needs.

use serde::Serialize;

/// A message to deliver to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Welcome {
        to: String,
        name: String,
    },
    EnrollmentConfirmed {
        to: String,
        name: String,
        course_title: String,
    },
    SubscriptionConfirmed {
        to: String,
        name: String,
        plan_id: String,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::Welcome { to, .. }
            | Notification::EnrollmentConfirmed { to, .. }
            | Notification::SubscriptionConfirmed { to, .. } => to,
        }
    }

    /// Short identifier used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "welcome",
            Notification::EnrollmentConfirmed { .. } => "enrollment_confirmed",
            Notification::SubscriptionConfirmed { .. } => "subscription_confirmed",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Notification::Welcome { .. } => "Welcome aboard".to_string(),
            Notification::EnrollmentConfirmed { course_title, .. } => {
                format!("You're enrolled in {}", course_title)
            }
            Notification::SubscriptionConfirmed { .. } => "Your subscription is active".to_string(),
        }
    }

    pub fn text_body(&self) -> String {
        match self {
            Notification::Welcome { name, .. } => {
                format!("Hi {},\n\nYour account is ready. Happy learning!", name)
            }
            Notification::EnrollmentConfirmed {
                name, course_title, ..
            } => format!(
                "Hi {},\n\nYou now have access to {}. Jump in whenever you're ready.",
                name, course_title
            ),
            Notification::SubscriptionConfirmed { name, plan_id, .. } => format!(
                "Hi {},\n\nThanks for subscribing to the {} plan.",
                name, plan_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_and_kind_per_variant() {
        let n = Notification::EnrollmentConfirmed {
            to: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            course_title: "Rust Basics".to_string(),
        };
        assert_eq!(n.recipient(), "ada@example.com");
        assert_eq!(n.kind(), "enrollment_confirmed");
        assert!(n.subject().contains("Rust Basics"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let n = Notification::Welcome {
            to: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["kind"], "welcome");
    }
}
