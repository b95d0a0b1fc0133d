use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::account::{Account, AccountRegistry, Session};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::storage::{KeyValueStore, StorageError};

use super::gate::{self, PUBLIC_ENTRY, Route, RouteDecision};
use super::state::{AuthState, SessionConfig, SessionEvent};

/// Toast title for failures of the durable store
pub const STORAGE_ERROR_TITLE: &str = "Storage Error";

/// Session manager errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Detail line shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::DuplicateEmail => "Email already in use",
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::Storage(_) => "Saved data could not be accessed",
        }
    }
}

/// Session manager: owns the single current session and orchestrates
/// registration, login and logout against the account registry.
pub struct SessionManager {
    registry: AccountRegistry,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    config: SessionConfig,
    state: AuthState,
    loading: bool,
}

impl SessionManager {
    /// Create an unauthenticated manager that logs notifications.
    ///
    /// The durable session slot is not read until `restore` is called.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, Arc::new(TracingNotifier), SessionConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        config: SessionConfig,
    ) -> Self {
        Self {
            registry: AccountRegistry::with_key(store.clone(), config.users_key.clone()),
            store,
            notifier,
            config,
            state: AuthState::Unauthenticated,
            loading: true,
        }
    }

    /// Create a manager and immediately restore any stored session
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        config: SessionConfig,
    ) -> Self {
        let mut manager = Self::with_config(store, notifier, config);
        manager.restore();
        manager
    }

    /// Read the durable session slot once and adopt it.
    ///
    /// An absent, unreadable or unparsable slot leaves the manager
    /// unauthenticated.
    pub fn restore(&mut self) -> Option<&Session> {
        self.state = match self.load_stored_session() {
            Some(session) => {
                info!("Restored session for account {}", session.id);
                AuthState::Authenticated(session)
            }
            None => AuthState::Unauthenticated,
        };
        self.loading = false;
        self.state.session()
    }

    /// Register a new account and sign it in
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> bool {
        self.try_register(name, email, password).is_ok()
    }

    /// Sign in with existing credentials
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        self.try_login(email, password).is_ok()
    }

    /// Like `register`, but returns the new session or the failure reason.
    /// Emits the same notification.
    pub fn try_register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let result = self.register_account(name, email, password);

        let outcome = if result.is_ok() { "success" } else { "failure" };
        counter!("petcare_registrations_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(session) => {
                info!("Registered account {}", session.id);
                self.emit(Notification::info(
                    "Registration Successful",
                    "Welcome to PetCare!",
                    self.config.display_duration,
                ));
            }
            Err(e) => {
                self.log_failure("Registration", e);
                self.emit(self.failure_notification("Registration Failed", e));
            }
        }

        result
    }

    /// Like `login`, but returns the session or the failure reason.
    /// Emits the same notification.
    pub fn try_login(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        let result = self.authenticate(email, password);

        let outcome = if result.is_ok() { "success" } else { "failure" };
        counter!("petcare_logins_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(session) => {
                info!("Account {} logged in", session.id);
                self.emit(Notification::info(
                    "Login Successful",
                    "Welcome back to PetCare!",
                    self.config.display_duration,
                ));
            }
            Err(e) => {
                self.log_failure("Login", e);
                self.emit(self.failure_notification("Login Failed", e));
            }
        }

        result
    }

    /// Clear the current session. Valid in any state.
    ///
    /// Returns the navigation event for the presentation layer instead of
    /// navigating itself.
    pub fn logout(&mut self) -> SessionEvent {
        if let Err(e) = self.store.remove(&self.config.session_key) {
            error!("Failed to clear stored session: {}", e);
        }

        if let AuthState::Authenticated(session) = &self.state {
            info!("Account {} logged out", session.id);
        } else {
            debug!("Logout requested without an active session");
        }
        self.state = AuthState::Unauthenticated;
        counter!("petcare_logouts_total").increment(1);

        self.emit(Notification::info(
            "Logged Out",
            "You have been successfully logged out",
            self.config.display_duration,
        ));

        SessionEvent::LoggedOut {
            redirect: PUBLIC_ENTRY,
        }
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.state.session()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// True only until the stored session has been read
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authorized(&self) -> bool {
        gate::is_authorized(&self.state)
    }

    /// Decide whether `route` renders or redirects for the current state
    pub fn resolve_route(&self, route: Route) -> RouteDecision {
        gate::resolve(route, &self.state)
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    fn register_account(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if self.registry.exists_by_email(email)? {
            return Err(AuthError::DuplicateEmail);
        }

        let account = Account::new(name, email, password);
        let session = account.to_session();
        self.registry.append(account)?;

        // A registration that cannot sign in leaves no account behind
        if let Err(e) = self.persist_session(&session) {
            if let Err(rollback) = self.registry.retract(&session.id) {
                error!(
                    "Failed to roll back account {} after session write failure: {}",
                    session.id, rollback
                );
            }
            return Err(e.into());
        }

        self.state = AuthState::Authenticated(session.clone());
        Ok(session)
    }

    fn authenticate(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .registry
            .find_by_credentials(email, password)?
            .ok_or(AuthError::InvalidCredentials)?;

        let session = account.to_session();
        self.persist_session(&session)?;
        self.state = AuthState::Authenticated(session.clone());
        Ok(session)
    }

    fn persist_session(&self, session: &Session) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)?;
        self.store.set(&self.config.session_key, &raw)
    }

    fn load_stored_session(&self) -> Option<Session> {
        let raw = match self.store.get(&self.config.session_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Failed to read stored session: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring unparsable stored session: {}", e);
                None
            }
        }
    }

    fn log_failure(&self, operation: &str, err: &AuthError) {
        match err {
            AuthError::Storage(e) => error!("{} failed: {}", operation, e),
            other => debug!("{} rejected: {}", operation, other),
        }
    }

    /// Storage faults get their own title; user errors use the operation's
    fn failure_notification(&self, title: &str, err: &AuthError) -> Notification {
        let title = match err {
            AuthError::Storage(_) => STORAGE_ERROR_TITLE,
            _ => title,
        };
        Notification::error(title, err.user_message(), self.config.display_duration)
    }

    fn emit(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}
