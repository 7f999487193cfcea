//! Account handlers.
//!
//! ## Commands
//! - Email/password registration with identity rollback
//! - Sign-in callback completion

mod complete_sign_in;
mod register_user;
mod registration_compensator;

pub use complete_sign_in::{CompleteSignInCommand, CompleteSignInHandler, CompleteSignInResult};
pub use register_user::{RegisterUserCommand, RegisterUserHandler};
pub use registration_compensator::RegistrationCompensator;
