//! Authorization gate and route table of the dashboard shell

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::state::AuthState;

/// Views of the dashboard shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, always forwards to the login view
    Root,
    Login,
    Register,
    /// Protected view; requires an authenticated session
    Dashboard,
}

/// Public entry view unauthenticated users are sent to
pub const PUBLIC_ENTRY: Route = Route::Login;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Trailing slashes are not significant, except for the root itself
        let trimmed = s.trim_end_matches('/');
        match trimmed {
            "" => Ok(Route::Root),
            "/login" => Ok(Route::Login),
            "/register" => Ok(Route::Register),
            "/dashboard" => Ok(Route::Dashboard),
            _ => Err(UnknownRoute(s.to_string())),
        }
    }
}

/// What the presentation layer should do for a requested route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
}

pub fn is_authorized(state: &AuthState) -> bool {
    state.is_authenticated()
}

/// Resolve a requested route against the current state
pub fn resolve(route: Route, state: &AuthState) -> RouteDecision {
    match route {
        Route::Root => RouteDecision::Redirect(PUBLIC_ENTRY),
        r if r.is_protected() && !is_authorized(state) => RouteDecision::Redirect(PUBLIC_ENTRY),
        r => RouteDecision::Render(r),
    }
}
