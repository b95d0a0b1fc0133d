//! Durable key-value storage port
//!
//! This module provides:
//! - `KeyValueStore` trait the registry and session manager depend on
//! - `MemoryStore` for tests and embedding
//! - `FileStore` persisting one JSON document per key in a data directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Key holding the JSON array of accounts
pub const USERS_KEY: &str = "users";

/// Key holding the JSON object of the current session
pub const SESSION_KEY: &str = "user";

/// Errors raised by storage adapters
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Refusing to overwrite unparsable value under key {0:?}")]
    Corrupt(String),
}

/// Flat string key-value namespace shared by every context using the same scope.
///
/// Values are opaque strings; callers own the encoding. No locking or
/// versioning is offered across writers.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys map directly to file names in `FileStore`, so both adapters accept
/// the same restricted alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
