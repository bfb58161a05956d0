//! Capability traits for the external identity provider and user-link store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store and auth actions only talk to these traits. The Supabase
//! client implements them in the browser; tests implement them with scripted
//! fakes.
//!
//! DESIGN
//! ======
//! Change notifications are delivered over unbounded channels. Releasing a
//! subscription drops its sender, which ends the receiving stream, so a
//! consumer loop terminates without extra signalling.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::channel::mpsc;

use super::types::{AuthChange, Session, UserRecord};

/// Failures reported by identity-provider and user-link calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Human-readable rejection reported by the provider (bad credentials etc).
    #[error("{0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("identity provider is not available")]
    Unavailable,
}

/// Handle identifying one change subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Live change subscription returned by [`IdentityProvider::on_auth_state_change`].
pub struct AuthSubscription {
    pub id: SubscriptionId,
    pub changes: mpsc::UnboundedReceiver<AuthChange>,
}

/// External identity provider capability set.
#[async_trait(?Send)]
pub trait IdentityProvider: Send + Sync {
    /// Point-in-time fetch of the current session.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Register for session transitions (sign-in, sign-out, refresh).
    fn on_auth_state_change(&self) -> AuthSubscription;

    /// Release a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Internal user records that can be linked to an external identity.
#[async_trait(?Send)]
pub trait UserLinkStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Set the identity id on the record matched by `email`.
    async fn link_identity(&self, email: &str, identity_id: &str) -> Result<(), AuthError>;
}

pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;
pub type SharedUserLinkStore = Arc<dyn UserLinkStore>;

/// Fan-out registry of change subscribers.
#[derive(Default)]
pub struct ChangeBroadcaster {
    inner: Mutex<BroadcasterInner>,
}

#[derive(Default)]
struct BroadcasterInner {
    next_id: u64,
    senders: Vec<(SubscriptionId, mpsc::UnboundedSender<AuthChange>)>,
}

impl ChangeBroadcaster {
    pub fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.senders.push((id, tx));
        AuthSubscription { id, changes: rx }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.senders.retain(|(sid, _)| *sid != id);
    }

    /// Deliver `change` to every live subscriber, pruning closed receivers.
    pub fn publish(&self, change: &AuthChange) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .senders
            .retain(|(_, tx)| tx.unbounded_send(change.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).senders.len()
    }
}
