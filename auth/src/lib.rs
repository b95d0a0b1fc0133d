//! PetCare identity and session core
//!
//! This crate exports the account registry, the session manager and the
//! storage port they depend on, for use by the `petcare` binary, integration
//! tests and any presentation layer embedding the core.

pub mod account;
pub mod config;
pub mod notify;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use account::{Account, AccountRegistry, Session};
pub use notify::{Notification, NotificationQueue, Notifier, Severity, TracingNotifier};
pub use session::{AuthError, AuthState, Route, RouteDecision, SessionEvent, SessionManager};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
