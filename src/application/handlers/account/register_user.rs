//! RegisterUserHandler - Command handler for email/password signup.

use std::sync::Arc;

use super::registration_compensator::RegistrationCompensator;
use crate::domain::account::{AccountError, Registration, User};
use crate::domain::notification::Notification;
use crate::ports::{AuthProvider, IdentityError, Notifier, UserRepository};

/// Command to register a new account.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub password: String,
    pub name: String,
    pub locale: Option<String>,
}

/// Handler for signup.
///
/// Creates the identity at the provider, then the local user. A failed local
/// insert triggers the compensator so no orphaned identity remains.
pub struct RegisterUserHandler {
    auth_provider: Arc<dyn AuthProvider>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    compensator: RegistrationCompensator,
}

impl RegisterUserHandler {
    pub fn new(
        auth_provider: Arc<dyn AuthProvider>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            compensator: RegistrationCompensator::new(auth_provider.clone()),
            auth_provider,
            users,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<User, AccountError> {
        // 1. Validate input
        let registration =
            Registration::try_new(&cmd.email, cmd.password, &cmd.name, cmd.locale.as_deref())?;

        // 2. Create the identity
        let identity = self
            .auth_provider
            .sign_up(&registration)
            .await
            .map_err(|e| match e {
                IdentityError::EmailTaken => AccountError::EmailTaken,
                IdentityError::Rejected(reason) => AccountError::rejected(reason),
                other => {
                    tracing::error!(error = %other, "Identity provider sign-up failed");
                    AccountError::provider(other.to_string())
                }
            })?;

        // 3. Create the local user, rolling back the identity on failure
        let user = User::register(
            &identity.id,
            &registration.email,
            &registration.name,
            registration.locale.clone(),
        );
        if let Err(e) = self.users.insert_user(&user).await {
            return Err(self.compensator.compensate(&identity.id, &e).await);
        }

        tracing::info!(user_id = %user.id, external_id = %identity.id, "User registered");

        // 4. Welcome email, best effort
        self.notifier.notify(Notification::Welcome {
            to: user.email.clone(),
            name: user.display_name.clone(),
        });

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockAuthProvider;
    use crate::adapters::memory::InMemoryEntitlementStore;
    use crate::adapters::notification::RecordingNotifier;
    use crate::domain::foundation::{ErrorCode, UserRole};

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct Fixture {
        store: Arc<InMemoryEntitlementStore>,
        auth: Arc<MockAuthProvider>,
        notifier: Arc<RecordingNotifier>,
        handler: RegisterUserHandler,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let auth = Arc::new(MockAuthProvider::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let handler = RegisterUserHandler::new(auth.clone(), store.clone(), notifier.clone());
        Fixture {
            store,
            auth,
            notifier,
            handler,
        }
    }

    fn command() -> RegisterUserCommand {
        RegisterUserCommand {
            email: "Ada@Example.com".to_string(),
            password: "correct-horse".to_string(),
            name: "Ada".to_string(),
            locale: None,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Success
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn registers_user_and_queues_welcome() {
        let f = fixture();

        let user = f.handler.handle(command()).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.locale, "en");
        assert_eq!(user.external_id, "ext-1");
        assert_eq!(f.store.users().await.len(), 1);
        assert!(f.auth.deleted_users().is_empty());
        assert!(matches!(
            f.notifier.notifications()[0],
            Notification::Welcome { .. }
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Failures
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_input_never_reaches_provider() {
        let f = fixture();
        let mut cmd = command();
        cmd.password = "short".to_string();

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(err.field(), Some("password"));
        assert!(f.auth.signups().is_empty());
    }

    #[tokio::test]
    async fn taken_email_is_conflict() {
        let f = fixture();
        f.auth.fail_sign_ups(IdentityError::EmailTaken);

        let err = f.handler.handle(command()).await.unwrap_err();

        assert_eq!(err, AccountError::EmailTaken);
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn rejected_input_is_bad_request() {
        let f = fixture();
        f.auth.fail_sign_ups(IdentityError::Rejected("Password is too weak".to_string()));

        let err = f.handler.handle(command()).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn persistence_failure_deletes_identity_exactly_once() {
        let f = fixture();
        f.store.fail_user_inserts(true);

        let err = f.handler.handle(command()).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(f.auth.deleted_users(), vec!["ext-1".to_string()]);
        assert!(f.notifier.notifications().is_empty());
    }
}
