//! Application configuration
//!
//! Configuration is loaded from environment variables; unset or invalid
//! values fall back to the defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::notify::DEFAULT_DISPLAY_DURATION;
use crate::session::SessionConfig;
use tracing::warn;

use crate::storage::{SESSION_KEY, USERS_KEY, validate_key};

/// Main configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Notification configuration
    pub notification: NotificationConfig,
}

/// Durable store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one JSON file per key
    pub data_dir: PathBuf,
    /// Key of the account collection
    pub users_key: String,
    /// Key of the current session slot
    pub session_key: String,
}

/// Outcome notification configuration
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// How long a toast stays visible
    pub display_duration: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./petcare-data"),
            users_key: USERS_KEY.to_string(),
            session_key: SESSION_KEY.to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_duration: DEFAULT_DISPLAY_DURATION,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Storage config
        if let Some(dir) = lookup("PETCARE_DATA_DIR")
            && !dir.is_empty()
        {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("PETCARE_USERS_KEY")
            && validate_key(&key).is_ok()
        {
            config.storage.users_key = key;
        }
        if let Some(key) = lookup("PETCARE_SESSION_KEY")
            && validate_key(&key).is_ok()
        {
            config.storage.session_key = key;
        }
        // Accounts and the session slot must never share a key
        if config.storage.users_key == config.storage.session_key {
            warn!(
                "Users key and session key are both {:?}; using defaults",
                config.storage.users_key
            );
            config.storage.users_key = USERS_KEY.to_string();
            config.storage.session_key = SESSION_KEY.to_string();
        }

        // Notification config
        if let Some(val) = lookup("PETCARE_TOAST_DURATION_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.notification.display_duration = Duration::from_millis(ms);
        }

        config
    }

    /// Session manager settings derived from this configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            users_key: self.storage.users_key.clone(),
            session_key: self.storage.session_key.clone(),
            display_duration: self.notification.display_duration,
        }
    }
}
