//! CompleteSignInHandler - Finishes a provider sign-in redirect.
//!
//! Exchanges the callback code for a session, then creates the local user on
//! first sign-in or refreshes profile fields from the provider afterwards.

use std::sync::Arc;

use crate::domain::account::{AccountError, User};
use crate::domain::foundation::DomainError;
use crate::ports::{AuthProvider, ExternalIdentity, IdentityError, IdentitySession, UserRepository};

/// Command carrying the callback's authorization code.
#[derive(Debug, Clone)]
pub struct CompleteSignInCommand {
    pub code: String,
}

/// Result of a completed sign-in.
#[derive(Debug, Clone)]
pub struct CompleteSignInResult {
    pub session: IdentitySession,
    pub user: User,
    /// True on the user's first sign-in.
    pub created: bool,
}

/// Handler for sign-in callbacks.
pub struct CompleteSignInHandler {
    auth_provider: Arc<dyn AuthProvider>,
    users: Arc<dyn UserRepository>,
}

impl CompleteSignInHandler {
    pub fn new(auth_provider: Arc<dyn AuthProvider>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            auth_provider,
            users,
        }
    }

    pub async fn handle(&self, cmd: CompleteSignInCommand) -> Result<CompleteSignInResult, AccountError> {
        let code = cmd.code.trim();
        if code.is_empty() {
            return Err(AccountError::validation("code", "code is required"));
        }

        let session = self.auth_provider.exchange_code(code).await.map_err(|e| {
            match &e {
                IdentityError::Unavailable(_) => {
                    tracing::error!(error = %e, "Authorization code exchange failed")
                }
                _ => tracing::debug!(error = %e, "Authorization code rejected"),
            }
            AccountError::InvalidAuthorizationCode
        })?;

        let (user, created) = self.sync_user(&session.identity).await?;

        Ok(CompleteSignInResult {
            session,
            user,
            created,
        })
    }

    async fn sync_user(&self, identity: &ExternalIdentity) -> Result<(User, bool), AccountError> {
        if let Some(mut user) = self.users.find_user_by_external_id(&identity.id).await? {
            if user.refresh_from_identity(
                identity.email.as_deref(),
                identity.name.as_deref(),
                identity.locale.as_deref(),
            ) {
                self.users.update_user(&user).await?;
                tracing::debug!(user_id = %user.id, "Profile refreshed from identity provider");
            }
            return Ok((user, false));
        }

        let email = identity
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AccountError::provider("identity has no email address"))?
            .to_lowercase();
        let name = identity
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let user = User::register(&identity.id, email, name, identity.locale.clone());
        match self.users.insert_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, external_id = %identity.id, "User created on first sign-in");
                Ok((user, true))
            }
            // A concurrent callback for the same identity won.
            Err(e) if e.is_conflict() => {
                let existing = self
                    .users
                    .find_user_by_external_id(&identity.id)
                    .await?
                    .ok_or_else(|| AccountError::from(DomainError::database(e.to_string())))?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockAuthProvider;
    use crate::adapters::memory::InMemoryEntitlementStore;

    fn session(email: &str, name: Option<&str>) -> IdentitySession {
        IdentitySession {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_in: 3600,
            identity: ExternalIdentity {
                id: "ext-42".to_string(),
                email: Some(email.to_string()),
                name: name.map(str::to_string),
                locale: None,
            },
        }
    }

    fn handler(auth: MockAuthProvider) -> (CompleteSignInHandler, Arc<InMemoryEntitlementStore>) {
        let store = Arc::new(InMemoryEntitlementStore::new());
        (CompleteSignInHandler::new(Arc::new(auth), store.clone()), store)
    }

    fn command(code: &str) -> CompleteSignInCommand {
        CompleteSignInCommand {
            code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn first_sign_in_creates_user() {
        let (handler, store) =
            handler(MockAuthProvider::new().with_session("code-1", session("ada@example.com", None)));

        let result = handler.handle(command("code-1")).await.unwrap();

        assert!(result.created);
        assert_eq!(result.user.display_name, "ada");
        assert_eq!(store.users().await.len(), 1);
    }

    #[tokio::test]
    async fn later_sign_in_refreshes_profile() {
        let auth = MockAuthProvider::new()
            .with_session("code-1", session("ada@example.com", Some("Ada")))
            .with_session("code-2", session("ada@lovelace.dev", Some("Ada L.")));
        let (handler, store) = handler(auth);

        handler.handle(command("code-1")).await.unwrap();
        let second = handler.handle(command("code-2")).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.user.email, "ada@lovelace.dev");
        let users = store.users().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name, "Ada L.");
    }

    #[tokio::test]
    async fn unknown_code_is_unauthorized() {
        let (handler, _) = handler(MockAuthProvider::new());

        let err = handler.handle(command("bogus")).await.unwrap_err();

        assert_eq!(err, AccountError::InvalidAuthorizationCode);
    }
}
