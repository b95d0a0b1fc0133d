//! Session management for the dashboard shell
//!
//! This module provides:
//! - `SessionManager` for register/login/logout and the current session
//! - `AuthState` and `SessionEvent` exposed to the presentation layer
//! - The authorization gate and route table

pub mod gate;
pub mod manager;
pub mod state;

pub use gate::{PUBLIC_ENTRY, Route, RouteDecision, UnknownRoute, is_authorized, resolve};
pub use manager::{AuthError, STORAGE_ERROR_TITLE, SessionManager};
pub use state::{AuthState, SessionConfig, SessionEvent};
