//! Registration, login and session resolution.

use auth::{AuthError, Session, SessionStore};
use entities::{Registration, User, ValidationErrors, normalize_email};
use todo_store::{StoreError, TodoStore};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::CurrentSession;
use crate::state::AppState;

const DUMMY_PASSWORD: &str = "not-a-real-password";

/// Account operations.
pub struct AccountService<'a, S: TodoStore> {
    state: &'a AppState<S>,
}

impl<'a, S: TodoStore> AccountService<'a, S> {
    /// Creates a service over the application state.
    pub fn new(state: &'a AppState<S>) -> Self {
        Self { state }
    }

    /// Registers a new user and logs them in.
    ///
    /// All validation failures are reported together.
    pub async fn register(&self, registration: Registration) -> ServerResult<(User, Session)> {
        let email = normalize_email(&registration.email);
        let email_taken =
            !email.is_empty() && self.state.store.get_user_by_email(&email).await?.is_some();
        registration.validate(email_taken)?;

        let user = self.create_user(&email, &registration.password).await?;
        let session = self.start_session(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, session))
    }

    /// Creates a user with a hashed password, without logging them in.
    pub async fn create_user(&self, email: &str, password: &str) -> ServerResult<User> {
        let password_hash = hash_blocking(password.to_string(), self.state.config.bcrypt_cost).await?;

        match self
            .state
            .store
            .create_user(User::new(normalize_email(email), password_hash))
            .await
        {
            Ok(user) => Ok(user),
            Err(StoreError::AlreadyExists { .. }) => {
                let mut errors = ValidationErrors::new();
                errors.add("Email", "has already been taken");
                Err(errors.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Checks credentials and starts a session.
    ///
    /// Unknown emails and wrong passwords fail identically, and both pay for
    /// a bcrypt verification.
    pub async fn login(&self, email: &str, password: &str) -> ServerResult<(User, Session)> {
        let email = normalize_email(email);
        let Some(user) = self.state.store.get_user_by_email(&email).await? else {
            tracing::debug!("Login attempt for unknown email");
            let dummy_hash = self.dummy_password_hash().await?;
            verify_blocking(password.to_string(), dummy_hash.to_string()).await?;
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let session = self.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok((user, session))
    }

    /// Ends a session. Unknown or missing sessions are ignored.
    pub async fn logout(&self, token: Option<&str>) -> ServerResult<()> {
        if let Some(token) = token {
            self.state.sessions.remove(token).await?;
        }
        Ok(())
    }

    /// Resolves a session token to the logged-in user.
    ///
    /// Expired sessions and sessions whose user is gone are removed.
    pub async fn current_session(&self, token: &str) -> ServerResult<Option<CurrentSession>> {
        let Some(session) = self.state.sessions.get(token).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            tracing::debug!(user_id = %session.user_id, "Session expired");
            self.state.sessions.remove(token).await?;
            return Ok(None);
        }

        match self.state.store.get_user(session.user_id).await? {
            Some(user) => Ok(Some(CurrentSession { user, session })),
            None => {
                tracing::debug!(user_id = %session.user_id, "Session belongs to a deleted user");
                self.state.sessions.remove(token).await?;
                Ok(None)
            }
        }
    }

    /// Deletes a user with their todos and sessions.
    pub async fn delete_user(&self, user_id: Uuid) -> ServerResult<()> {
        self.state.store.delete_user(user_id).await?;
        let revoked = self.state.sessions.remove_for_user(user_id).await?;
        tracing::info!(%user_id, revoked, "User deleted");
        Ok(())
    }

    async fn dummy_password_hash(&self) -> ServerResult<&'a str> {
        let state = self.state;
        let cost = state.config.bcrypt_cost;
        state
            .dummy_password_hash
            .get_or_try_init(|| hash_blocking(DUMMY_PASSWORD.to_string(), cost))
            .await
            .map(String::as_str)
    }

    async fn start_session(&self, user: &User) -> ServerResult<Session> {
        let session = Session::new(user.id, self.state.config.session_ttl())?;
        self.state.sessions.insert(&session).await?;
        Ok(session)
    }
}

async fn hash_blocking(password: String, cost: u32) -> ServerResult<String> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
        .await
        .map_err(|e| ServerError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(ServerError::from)
}

async fn verify_blocking(password: String, hash: String) -> ServerResult<bool> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| ServerError::Internal(format!("Password verification task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use auth::{MIN_BCRYPT_COST, MemorySessionStore};
    use tera::Tera;
    use todo_store::MemoryTodoStore;

    use super::*;
    use crate::config::Config;

    fn state() -> AppState<MemoryTodoStore> {
        let config = Config {
            bcrypt_cost: MIN_BCRYPT_COST,
            ..Config::default()
        };
        AppState::new(
            config,
            MemoryTodoStore::new(),
            MemorySessionStore::new(),
            Tera::default(),
        )
    }

    fn registration(email: &str) -> Registration {
        Registration::new(email, "password123", "password123")
    }

    #[tokio::test]
    async fn test_register_logs_in() {
        let state = state();
        let service = AccountService::new(&state);

        let (user, session) = service
            .register(registration(" New@Example.com "))
            .await
            .unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_ne!(user.password_hash, "password123");

        let current = service.current_session(&session.token).await.unwrap().unwrap();
        assert_eq!(current.user.id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let state = state();
        let service = AccountService::new(&state);
        service.register(registration("taken@example.com")).await.unwrap();

        let error = service
            .register(registration("TAKEN@example.com"))
            .await
            .unwrap_err();
        match error {
            ServerError::Validation(errors) => {
                assert_eq!(errors.messages(), ["Email has already been taken"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_with_mismatched_confirmation_creates_nothing() {
        let state = state();
        let service = AccountService::new(&state);

        let result = service
            .register(Registration::new("user@example.com", "password123", "password124"))
            .await;
        assert!(matches!(result, Err(ServerError::Validation(_))));
        assert!(
            state
                .store
                .get_user_by_email("user@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_login() {
        let state = state();
        let service = AccountService::new(&state);
        let (user, _) = service.register(registration("login@example.com")).await.unwrap();

        let (logged_in, session) = service
            .login("Login@Example.com", "password123")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(session.user_id, user.id);

        for (email, password) in [
            ("login@example.com", "wrong-password"),
            ("nobody@example.com", "password123"),
        ] {
            let error = service.login(email, password).await.unwrap_err();
            assert!(matches!(
                error,
                ServerError::Auth(AuthError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_hash() {
        let state = state();
        let service = AccountService::new(&state);
        assert!(state.dummy_password_hash.get().is_none());

        let error = service
            .login("nobody@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(error, ServerError::Auth(AuthError::InvalidCredentials)));

        let dummy_hash = state.dummy_password_hash.get().expect("dummy hash is built");
        assert!(dummy_hash.starts_with("$2"));
        assert_eq!(
            dummy_hash.split('$').nth(2),
            Some(format!("{MIN_BCRYPT_COST:02}").as_str())
        );
        assert!(!auth::verify_password("password123", dummy_hash));
    }

    #[tokio::test]
    async fn test_register_with_huge_session_ttl() {
        let config = Config {
            bcrypt_cost: MIN_BCRYPT_COST,
            session_ttl_hours: i64::MAX,
            ..Config::default()
        };
        let state = AppState::new(
            config,
            MemoryTodoStore::new(),
            MemorySessionStore::new(),
            Tera::default(),
        );
        let service = AccountService::new(&state);

        let (_, session) = service.register(registration("long@example.com")).await.unwrap();
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn test_logout_is_unconditional() {
        let state = state();
        let service = AccountService::new(&state);
        let (_, session) = service.register(registration("out@example.com")).await.unwrap();

        service.logout(Some(&session.token)).await.unwrap();
        assert!(service.current_session(&session.token).await.unwrap().is_none());

        service.logout(Some(&session.token)).await.unwrap();
        service.logout(Some("unknown")).await.unwrap();
        service.logout(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let state = state();
        let service = AccountService::new(&state);
        let (user, _) = service.register(registration("old@example.com")).await.unwrap();

        let mut session = Session::new(user.id, chrono::Duration::hours(1)).unwrap();
        session.expires_at = chrono::Utc::now() - chrono::Duration::seconds(1);
        state.sessions.insert(&session).await.unwrap();

        assert!(service.current_session(&session.token).await.unwrap().is_none());
        assert!(state.sessions.get(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_revokes_sessions() {
        let state = state();
        let service = AccountService::new(&state);
        let (user, session) = service.register(registration("bye@example.com")).await.unwrap();

        service.delete_user(user.id).await.unwrap();

        assert!(state.sessions.get(&session.token).await.unwrap().is_none());
        assert!(state.store.get_user(user.id).await.unwrap().is_none());
        assert!(service.delete_user(user.id).await.is_err());
    }

    #[tokio::test]
    async fn test_session_of_deleted_user_does_not_resolve() {
        let state = state();
        let service = AccountService::new(&state);
        let (user, session) = service.register(registration("gone@example.com")).await.unwrap();

        state.store.delete_user(user.id).await.unwrap();

        assert!(service.current_session(&session.token).await.unwrap().is_none());
    }
}
