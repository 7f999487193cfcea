//! Mock authentication adapters for testing.
//!
//! These adapters implement the `SessionValidator` and `AuthProvider` ports
//! for use in tests, avoiding the need for a real identity provider.
//!
//! # Example
//!
//! ```ignore
//! use course_market::adapters::auth::{MockAuthProvider, MockSessionValidator};
//!
//! let validator = MockSessionValidator::new().with_token("valid-token", "ext-123");
//! let auth = MockAuthProvider::new();
//! auth.fail_deletes(IdentityError::Unavailable("down".into()));
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::domain::account::Registration;
use crate::domain::foundation::{AuthError, VerifiedToken};
use crate::ports::{AuthProvider, ExternalIdentity, IdentityError, IdentitySession, SessionValidator};

/// Mock session validator for testing.
///
/// Stores a map of tokens to subjects. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, VerifiedToken>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token for the given identity provider subject.
    pub fn with_token(self, token: impl Into<String>, external_id: impl Into<String>) -> Self {
        self.tokens.write().unwrap().insert(
            token.into(),
            VerifiedToken {
                external_id: external_id.into(),
                email: None,
            },
        );
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Mock identity provider for testing.
///
/// `sign_up` hands out sequential ids (`ext-1`, `ext-2`, ...). All calls to
/// `delete_user` are recorded.
#[derive(Debug, Default)]
pub struct MockAuthProvider {
    state: Mutex<MockAuthState>,
}

#[derive(Debug, Default)]
struct MockAuthState {
    signups: Vec<String>,
    deleted: Vec<String>,
    sessions: HashMap<String, IdentitySession>,
    sign_up_error: Option<IdentityError>,
    delete_error: Option<IdentityError>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `sign_up` fail with `error`.
    pub fn fail_sign_ups(&self, error: IdentityError) {
        self.state.lock().unwrap().sign_up_error = Some(error);
    }

    /// Makes `delete_user` fail with `error` (the call is still recorded).
    pub fn fail_deletes(&self, error: IdentityError) {
        self.state.lock().unwrap().delete_error = Some(error);
    }

    /// Registers a code that `exchange_code` accepts.
    pub fn with_session(self, code: impl Into<String>, session: IdentitySession) -> Self {
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(code.into(), session);
        self
    }

    /// Emails passed to successful `sign_up` calls.
    pub fn signups(&self) -> Vec<String> {
        self.state.lock().unwrap().signups.clone()
    }

    /// External ids passed to `delete_user`.
    pub fn deleted_users(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_up(&self, registration: &Registration) -> Result<ExternalIdentity, IdentityError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.sign_up_error.clone() {
            return Err(error);
        }
        state.signups.push(registration.email.clone());
        Ok(ExternalIdentity {
            id: format!("ext-{}", state.signups.len()),
            email: Some(registration.email.clone()),
            name: Some(registration.name.clone()),
            locale: registration.locale.clone(),
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<IdentitySession, IdentityError> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .get(code)
            .cloned()
            .ok_or(IdentityError::InvalidCode)
    }

    async fn delete_user(&self, external_id: &str) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.deleted.push(external_id.to_string());
        match state.delete_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
