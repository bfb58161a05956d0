//! Identity and session DTOs shared by the session store and the Supabase client.
//!
//! DESIGN
//! ======
//! Field names follow the GoTrue/PostgREST JSON payloads so responses decode
//! without intermediate mapping types.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Identity attached to a session by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-issued identity id (UUID string).
    pub id: String,
    /// Primary e-mail address, when the provider knows one.
    #[serde(default)]
    pub email: Option<String>,
}

/// Proof of an authenticated identity.
///
/// No expiry is enforced by the guard; `expires_at` is only consulted by the
/// Supabase client when deciding whether to refresh a persisted session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) after which the access token is stale.
    pub expires_at: i64,
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    /// Whether the access token expires within `leeway_secs` of `now_secs`.
    pub fn expires_within(&self, now_secs: i64, leeway_secs: i64) -> bool {
        self.expires_at <= now_secs.saturating_add(leeway_secs)
    }
}

/// Kind of session transition reported by the identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// One session transition notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthChange {
    pub fn signed_in(session: Session) -> Self {
        Self { event: AuthEvent::SignedIn, session: Some(session) }
    }

    pub fn signed_out() -> Self {
        Self { event: AuthEvent::SignedOut, session: None }
    }

    pub fn token_refreshed(session: Session) -> Self {
        Self { event: AuthEvent::TokenRefreshed, session: Some(session) }
    }
}

/// Internal application user row matched by e-mail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    /// Linked identity-provider id; `None` until the first backfill.
    #[serde(default)]
    pub auth_user_id: Option<String>,
}

/// Token grant payload returned by `POST /auth/v1/token`.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<User>,
}

impl TokenResponse {
    /// Convert a grant into a session, deriving `expires_at` from
    /// `expires_in` when the provider omits it.
    pub fn into_session(self, now_secs: i64) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now_secs.saturating_add(self.expires_in));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}
