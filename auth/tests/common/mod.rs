//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

#![allow(dead_code)]

use petcare_auth::session::SessionConfig;
use petcare_auth::{KeyValueStore, MemoryStore, NotificationQueue, SessionManager};
use std::sync::Arc;

/// One "tab": a session manager over a shared store, with its own toast queue
pub struct TestTab {
    pub manager: SessionManager,
    pub toasts: NotificationQueue,
}

/// Start a fresh process over `store`, restoring any stored session
pub fn open_tab(store: Arc<dyn KeyValueStore>) -> TestTab {
    let toasts = NotificationQueue::new();
    let manager = SessionManager::open(store, Arc::new(toasts.clone()), SessionConfig::default());
    TestTab { manager, toasts }
}

/// Start a fresh process over an in-memory store, returning the store handle too
pub fn open_memory_tab() -> (TestTab, MemoryStore) {
    let store = MemoryStore::new();
    (open_tab(Arc::new(store.clone())), store)
}

/// Unique email for tests that share a store
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@pet.com", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}
