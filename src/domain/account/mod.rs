//! Account domain module.
//!
//! Local users linked to identity provider accounts, and signup validation.

mod errors;
mod registration;
mod user;

pub use errors::AccountError;
pub use registration::{Registration, MIN_PASSWORD_LENGTH};
pub use user::{User, DEFAULT_LOCALE};
