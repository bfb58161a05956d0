//! Supabase-backed identity provider and user-link store.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net` against GoTrue
//! (`/auth/v1`) and PostgREST (`/rest/v1`). Server-side (SSR): every call
//! reports [`AuthError::Unavailable`] since sessions live in the browser.
//!
//! DESIGN
//! ======
//! The session is persisted as JSON in `localStorage`. `get_session()` reads
//! it back and refreshes the token when it is about to expire; the refreshed
//! session is announced as a `TokenRefreshed` change.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx GoTrue responses are mapped to [`AuthError::Provider`] carrying the
//! server's own message, which the login form shows verbatim.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "supabase_test.rs"]
mod supabase_test;

use async_trait::async_trait;

use super::identity::{AuthError, AuthSubscription, ChangeBroadcaster, IdentityProvider, SubscriptionId, UserLinkStore};
use super::types::{Session, UserRecord};
use crate::config::ClientConfig;

#[cfg(feature = "hydrate")]
use super::types::{AuthChange, TokenResponse};
#[cfg(feature = "hydrate")]
use crate::util::ui_persistence;

pub const SESSION_STORAGE_KEY: &str = "scorecard.auth.session";
/// Refresh the access token when it expires within this many seconds.
pub const REFRESH_LEEWAY_SECS: i64 = 60;
pub const USERS_TABLE: &str = "users";

const NOT_CONFIGURED: &str = "Authentication is not configured.";

#[cfg(any(test, feature = "hydrate"))]
fn token_endpoint(base: &str, grant_type: &str) -> String {
    format!("{base}/auth/v1/token?grant_type={grant_type}")
}

#[cfg(any(test, feature = "hydrate"))]
fn logout_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/logout")
}

#[cfg(any(test, feature = "hydrate"))]
fn user_lookup_endpoint(base: &str, email: &str) -> String {
    format!(
        "{base}/rest/v1/{USERS_TABLE}?select=id,email,auth_user_id&email=eq.{}&limit=1",
        urlencoding::encode(email)
    )
}

/// Only rows without a linked identity match, so the update never
/// overwrites an existing link.
#[cfg(any(test, feature = "hydrate"))]
fn user_link_endpoint(base: &str, email: &str) -> String {
    format!(
        "{base}/rest/v1/{USERS_TABLE}?email=eq.{}&auth_user_id=is.null",
        urlencoding::encode(email)
    )
}

/// Extract the human-readable message from a GoTrue/PostgREST error body.
#[cfg(any(test, feature = "hydrate"))]
fn provider_error_message(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(serde_json::Value::as_str))
        })
        .filter(|msg| !msg.trim().is_empty())
        .map_or_else(|| format!("request failed: {status}"), str::to_owned)
}

#[cfg(feature = "hydrate")]
#[allow(clippy::cast_possible_truncation)]
fn now_secs() -> i64 {
    (js_sys::Date::now() / 1000.0) as i64
}

#[cfg(feature = "hydrate")]
fn network(e: gloo_net::Error) -> AuthError {
    AuthError::Network(e.to_string())
}

#[cfg(feature = "hydrate")]
async fn rejection(resp: gloo_net::http::Response) -> AuthError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    AuthError::Provider(provider_error_message(status, &body))
}

#[cfg(feature = "hydrate")]
fn stored_session() -> Option<Session> {
    ui_persistence::load_json::<Session>(SESSION_STORAGE_KEY)
}

/// GoTrue client implementing [`IdentityProvider`].
pub struct SupabaseAuth {
    config: ClientConfig,
    hub: ChangeBroadcaster,
}

impl SupabaseAuth {
    pub fn new(config: ClientConfig) -> Self {
        Self { config, hub: ChangeBroadcaster::default() }
    }

    #[cfg(feature = "hydrate")]
    async fn grant(&self, grant_type: &str, body: serde_json::Value) -> Result<Session, AuthError> {
        let resp = gloo_net::http::Request::post(&token_endpoint(&self.config.supabase_url, grant_type))
            .header("apikey", &self.config.supabase_anon_key)
            .json(&body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        if !resp.ok() {
            return Err(rejection(resp).await);
        }
        let token: TokenResponse = resp.json().await.map_err(|e| AuthError::Decode(e.to_string()))?;
        Ok(token.into_session(now_secs()))
    }

    #[cfg(feature = "hydrate")]
    fn store(&self, session: &Session) {
        ui_persistence::save_json(SESSION_STORAGE_KEY, session);
    }
}

#[async_trait(?Send)]
impl IdentityProvider for SupabaseAuth {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        if self.config.is_offline() {
            return Ok(None);
        }
        #[cfg(feature = "hydrate")]
        {
            let Some(stored) = stored_session() else {
                return Ok(None);
            };
            if !stored.expires_within(now_secs(), REFRESH_LEEWAY_SECS) {
                return Ok(Some(stored));
            }
            let body = serde_json::json!({ "refresh_token": stored.refresh_token });
            match self.grant("refresh_token", body).await {
                Ok(session) => {
                    self.store(&session);
                    self.hub.publish(&AuthChange::token_refreshed(session.clone()));
                    Ok(Some(session))
                }
                Err(AuthError::Provider(msg)) => {
                    log::info!("stored session rejected on refresh: {msg}");
                    ui_persistence::remove(SESSION_STORAGE_KEY);
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(AuthError::Unavailable)
        }
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.hub.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.hub.unsubscribe(id);
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if self.config.is_offline() {
            return Err(AuthError::Provider(NOT_CONFIGURED.to_owned()));
        }
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({ "email": email, "password": password });
            let session = self.grant("password", body).await?;
            self.store(&session);
            self.hub.publish(&AuthChange::signed_in(session));
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, password);
            Err(AuthError::Unavailable)
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        #[cfg(feature = "hydrate")]
        {
            let stored = stored_session();
            ui_persistence::remove(SESSION_STORAGE_KEY);
            self.hub.publish(&AuthChange::signed_out());

            let Some(stored) = stored.filter(|_| !self.config.is_offline()) else {
                return Ok(());
            };
            let resp = gloo_net::http::Request::post(&logout_endpoint(&self.config.supabase_url))
                .header("apikey", &self.config.supabase_anon_key)
                .header("Authorization", &format!("Bearer {}", stored.access_token))
                .send()
                .await
                .map_err(network)?;
            if !resp.ok() {
                return Err(rejection(resp).await);
            }
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(AuthError::Unavailable)
        }
    }
}

/// PostgREST access to the internal `users` table.
pub struct SupabaseUsers {
    config: ClientConfig,
}

impl SupabaseUsers {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Row-level security needs the signed-in user's token when there is one.
    #[cfg(feature = "hydrate")]
    fn bearer(&self) -> String {
        let token = stored_session().map_or_else(|| self.config.supabase_anon_key.clone(), |s| s.access_token);
        format!("Bearer {token}")
    }
}

#[async_trait(?Send)]
impl UserLinkStore for SupabaseUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        if self.config.is_offline() {
            return Ok(None);
        }
        #[cfg(feature = "hydrate")]
        {
            let resp = gloo_net::http::Request::get(&user_lookup_endpoint(&self.config.supabase_url, email))
                .header("apikey", &self.config.supabase_anon_key)
                .header("Authorization", &self.bearer())
                .send()
                .await
                .map_err(network)?;
            if !resp.ok() {
                return Err(rejection(resp).await);
            }
            let rows: Vec<UserRecord> = resp.json().await.map_err(|e| AuthError::Decode(e.to_string()))?;
            Ok(rows.into_iter().next())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = email;
            Err(AuthError::Unavailable)
        }
    }

    async fn link_identity(&self, email: &str, identity_id: &str) -> Result<(), AuthError> {
        if self.config.is_offline() {
            return Err(AuthError::Unavailable);
        }
        #[cfg(feature = "hydrate")]
        {
            let payload = serde_json::json!({ "auth_user_id": identity_id });
            let resp = gloo_net::http::Request::patch(&user_link_endpoint(&self.config.supabase_url, email))
                .header("apikey", &self.config.supabase_anon_key)
                .header("Authorization", &self.bearer())
                .header("Prefer", "return=minimal")
                .json(&payload)
                .map_err(network)?
                .send()
                .await
                .map_err(network)?;
            if !resp.ok() {
                return Err(rejection(resp).await);
            }
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, identity_id);
            Err(AuthError::Unavailable)
        }
    }
}
