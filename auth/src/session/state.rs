use std::time::Duration;

use crate::account::Session;
use crate::notify::DEFAULT_DISPLAY_DURATION;
use crate::storage::{SESSION_KEY, USERS_KEY};

use super::gate::Route;

/// Authentication state of one process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Events the presentation layer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session was cleared; navigate to `redirect`
    LoggedOut { redirect: Route },
}

/// Session manager configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Store key for the account collection
    pub users_key: String,
    /// Store key for the current session
    pub session_key: String,
    /// How long outcome notifications stay visible
    pub display_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            users_key: USERS_KEY.to_string(),
            session_key: SESSION_KEY.to_string(),
            display_duration: DEFAULT_DISPLAY_DURATION,
        }
    }
}
