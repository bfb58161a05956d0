//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Written only by the session store; read by the route guard, the layout
//! shell and user-aware components through a `RwSignal<AuthState>` context.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::{Session, User};

/// Current session plus the bootstrap loading flag.
///
/// `loading` starts `true` and flips to `false` exactly once, when the first
/// session check resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { session: None, loading: true }
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Identity of the signed-in user, if the session carries one.
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().and_then(|s| s.user.as_ref())
    }

    /// Label for chrome that shows who is signed in.
    pub fn display_name(&self) -> String {
        self.user()
            .and_then(|u| u.email.clone())
            .unwrap_or_else(|| "signed out".to_owned())
    }
}
