//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", stringify!($name), ".")]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", stringify!($name), " from an existing UUID.")]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Internal identifier of a marketplace user.
    UserId
);

uuid_id!(
    /// Identifier of a catalog course.
    CourseId
);

uuid_id!(
    /// Identifier of a locally mirrored subscription.
    SubscriptionId
);

uuid_id!(
    /// Identifier of a payment ledger entry.
    PaymentId
);

uuid_id!(
    /// Identifier of a course enrollment.
    EnrollmentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
        assert_ne!(EnrollmentId::new(), EnrollmentId::new());
    }

    #[test]
    fn id_parses_from_display_string() {
        let id = CourseId::new();
        let parsed: CourseId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_rejects_invalid_uuid() {
        assert!("not-a-uuid".parse::<PaymentId>().is_err());
    }

    #[test]
    fn id_serializes_transparently() {
        let uuid = Uuid::new_v4();
        let id = SubscriptionId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
