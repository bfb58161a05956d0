//! Route guard decision logic.
//!
//! SYSTEM CONTEXT
//! ==============
//! `components::route_guard::AuthGuard` evaluates these helpers on every
//! change of auth state or pathname. They are kept free of Leptos types so the
//! decision table can be tested directly.
//!
//! DESIGN
//! ======
//! The rendering decision is a pure function of `(session, loading,
//! on_login)`. Redirects are only requested once `loading` is false, so a page
//! load never redirects on an incomplete session check.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::state::auth::AuthState;

pub const LOGIN_PATH: &str = "/login";
pub const ROOT_PATH: &str = "/";

/// Whether `path` is the login route (`/login` or `/login/`).
pub fn is_login_route(path: &str) -> bool {
    let trimmed = path.trim_end_matches('/');
    trimmed == LOGIN_PATH
}

/// Guard state for one observation of auth state and route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardPhase {
    /// Initial session check still in flight.
    Loading { on_login: bool },
    UnauthenticatedOnLogin,
    UnauthenticatedElsewhere,
    AuthenticatedOnLogin,
    AuthenticatedElsewhere,
}

/// What the guard renders for a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardView {
    Loading,
    Children,
    Nothing,
}

impl GuardPhase {
    pub fn from_state(state: &AuthState, on_login: bool) -> Self {
        if state.loading {
            return Self::Loading { on_login };
        }
        match (state.is_authenticated(), on_login) {
            (false, true) => Self::UnauthenticatedOnLogin,
            (false, false) => Self::UnauthenticatedElsewhere,
            (true, true) => Self::AuthenticatedOnLogin,
            (true, false) => Self::AuthenticatedElsewhere,
        }
    }

    pub fn view(self) -> GuardView {
        match self {
            // The login form stays usable while the first check is pending.
            Self::Loading { on_login: true } => GuardView::Children,
            Self::Loading { on_login: false } => GuardView::Loading,
            Self::UnauthenticatedElsewhere => GuardView::Nothing,
            // Redirect away from login is navigation, not a render gate.
            Self::UnauthenticatedOnLogin | Self::AuthenticatedOnLogin | Self::AuthenticatedElsewhere => {
                GuardView::Children
            }
        }
    }

    pub fn redirect(self) -> Option<&'static str> {
        match self {
            Self::UnauthenticatedElsewhere => Some(LOGIN_PATH),
            Self::AuthenticatedOnLogin => Some(ROOT_PATH),
            Self::Loading { .. } | Self::UnauthenticatedOnLogin | Self::AuthenticatedElsewhere => None,
        }
    }
}

/// Suppresses duplicate navigation while inputs are unchanged.
///
/// A redirect for a given `(target, path)` pair is handed out once. The latch
/// re-arms when the phase stops requesting a redirect or the path changes.
#[derive(Clone, Debug, Default)]
pub struct RedirectLatch {
    issued: Option<(&'static str, String)>,
}

impl RedirectLatch {
    pub fn next_redirect(&mut self, phase: GuardPhase, path: &str) -> Option<&'static str> {
        let Some(target) = phase.redirect() else {
            self.issued = None;
            return None;
        };
        if let Some((issued_target, issued_path)) = &self.issued {
            if *issued_target == target && issued_path == path {
                return None;
            }
        }
        self.issued = Some((target, path.to_owned()));
        Some(target)
    }
}
