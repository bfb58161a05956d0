//! Auth actions invoked by the login form and the sidebar.
//!
//! ERROR HANDLING
//! ==============
//! Provider failures come back as user-visible message strings instead of
//! panics. Neither action writes session state: the provider's change
//! notification reaches the session store and propagates from there.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::identity::IdentityProvider;

/// Sign in with e-mail and password.
///
/// Inputs are expected to be validated (non-empty) by the caller.
///
/// # Errors
///
/// Returns the provider's human-readable message when sign-in is rejected.
pub async fn sign_in_with_password(provider: &dyn IdentityProvider, email: &str, password: &str) -> Result<(), String> {
    provider.sign_in_with_password(email, password).await.map_err(|e| {
        log::info!("sign-in rejected for {email}: {e}");
        e.to_string()
    })
}

/// Invalidate the current session.
///
/// # Errors
///
/// Returns an error string if the provider call fails.
pub async fn sign_out(provider: &dyn IdentityProvider) -> Result<(), String> {
    provider.sign_out().await.map_err(|e| {
        log::warn!("sign-out failed: {e}");
        e.to_string()
    })
}
