//! State machine trait for status enums.
//!
//! Gives subscription and payment statuses a shared vocabulary for asking
//! whether a move between two states is part of the expected lifecycle.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their expected transitions; validated transitions and
/// terminal-state detection are derived from that list.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for PaymentStatus {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Pending => vec![Completed],
///             Completed => vec![],
///         }
///     }
/// }
///
/// let next = PaymentStatus::Pending.transition_to(PaymentStatus::Completed)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    ///
    /// Staying in the same state is always allowed so that redelivered
    /// events stay harmless.
    fn can_transition_to(&self, target: &Self) -> bool {
        self == target || self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        On,
        Broken,
    }

    impl StateMachine for Light {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Off => vec![Light::On, Light::Broken],
                Light::On => vec![Light::Off, Light::Broken],
                Light::Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_listed_target() {
        assert_eq!(Light::Off.transition_to(Light::On), Ok(Light::On));
    }

    #[test]
    fn transition_to_fails_for_unlisted_target() {
        assert!(Light::Broken.transition_to(Light::On).is_err());
    }

    #[test]
    fn self_transition_is_always_allowed() {
        assert!(Light::Broken.can_transition_to(&Light::Broken));
    }

    #[test]
    fn is_terminal_follows_transition_list() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::Off.is_terminal());
    }
}
