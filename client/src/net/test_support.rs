//! Scripted identity provider and user-link store for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::channel::oneshot;

use super::identity::{AuthError, AuthSubscription, ChangeBroadcaster, IdentityProvider, SubscriptionId, UserLinkStore};
use super::types::{AuthChange, Session, User, UserRecord};

pub fn session_for(id: &str, email: Option<&str>) -> Session {
    Session {
        access_token: format!("access-{id}"),
        refresh_token: format!("refresh-{id}"),
        expires_at: 4_000_000_000,
        user: Some(User { id: id.to_owned(), email: email.map(str::to_owned) }),
    }
}

type FetchResult = Result<Option<Session>, AuthError>;

/// Identity provider whose `get_session()` either answers immediately or
/// waits on a oneshot the test resolves.
#[derive(Default)]
pub struct FakeProvider {
    pub hub: ChangeBroadcaster,
    immediate: Mutex<Option<FetchResult>>,
    gated: Mutex<Option<oneshot::Receiver<FetchResult>>>,
    sign_in_error: Mutex<Option<AuthError>>,
    pub fetches: AtomicUsize,
    pub unsubscribes: AtomicUsize,
    pub sign_outs: AtomicUsize,
}

impl FakeProvider {
    pub fn answering(result: FetchResult) -> Arc<Self> {
        let provider = Self::default();
        *provider.immediate.lock().unwrap() = Some(result);
        Arc::new(provider)
    }

    /// Provider whose first fetch resolves when the returned sender fires.
    pub fn gated() -> (Arc<Self>, oneshot::Sender<FetchResult>) {
        let (tx, rx) = oneshot::channel();
        let provider = Self::default();
        *provider.gated.lock().unwrap() = Some(rx);
        (Arc::new(provider), tx)
    }

    pub fn reject_sign_in(&self, err: AuthError) {
        *self.sign_in_error.lock().unwrap() = Some(err);
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeProvider {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gated.lock().unwrap().take();
        if let Some(rx) = gate {
            return rx.await.unwrap_or(Err(AuthError::Unavailable));
        }
        self.immediate.lock().unwrap().clone().unwrap_or(Ok(None))
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.hub.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        self.hub.unsubscribe(id);
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<(), AuthError> {
        if let Some(err) = self.sign_in_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.hub.publish(&AuthChange::signed_in(session_for("u-signed-in", Some(email))));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.hub.publish(&AuthChange::signed_out());
        Ok(())
    }
}

/// In-memory user table keyed by e-mail.
#[derive(Default)]
pub struct FakeLinks {
    pub records: Mutex<Vec<UserRecord>>,
    pub lookups: AtomicUsize,
    pub link_calls: Mutex<Vec<(String, String)>>,
    pub fail_lookup: bool,
    pub fail_link: bool,
    pub lookup_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeLinks {
    pub fn with_record(email: &str, auth_user_id: Option<&str>) -> Self {
        Self {
            records: Mutex::new(vec![UserRecord {
                id: "row-1".to_owned(),
                email: email.to_owned(),
                auth_user_id: auth_user_id.map(str::to_owned),
            }]),
            ..Self::default()
        }
    }

    /// Like [`FakeLinks::with_record`], but the first lookup waits until the
    /// returned sender fires.
    pub fn gated_record(email: &str, auth_user_id: Option<&str>) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let links = Self::with_record(email, auth_user_id);
        *links.lookup_gate.lock().unwrap() = Some(rx);
        (links, tx)
    }
}

#[async_trait(?Send)]
impl UserLinkStore for FakeLinks {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let gate = self.lookup_gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        if self.fail_lookup {
            return Err(AuthError::Network("lookup down".to_owned()));
        }
        Ok(self.records.lock().unwrap().iter().find(|r| r.email == email).cloned())
    }

    async fn link_identity(&self, email: &str, identity_id: &str) -> Result<(), AuthError> {
        self.link_calls.lock().unwrap().push((email.to_owned(), identity_id.to_owned()));
        if self.fail_link {
            return Err(AuthError::Provider("permission denied".to_owned()));
        }
        for record in self.records.lock().unwrap().iter_mut().filter(|r| r.email == email) {
            record.auth_user_id = Some(identity_id.to_owned());
        }
        Ok(())
    }
}
