//! Session store: single writer of [`AuthState`].
//!
//! SYSTEM CONTEXT
//! ==============
//! Owned by the root `App` component and fed by the identity provider. Every
//! other component observes the resulting `RwSignal<AuthState>` read-only.
//!
//! DESIGN
//! ======
//! Bootstrap is two-phase: one `get_session()` fetch, then a change
//! subscription. The subscription is attached before the fetched user's
//! backfill link runs, so no change is missed while the link is in flight. A monotonic generation counter is bumped on every commit; a
//! fetch result is only written if the generation it started at is still
//! current, so a late fetch never overwrites a newer notification.
//!
//! `teardown()` flips the `alive` latch before releasing the subscription.
//! Nothing is committed or broadcast once the latch is down, which covers
//! fetches that resolve after the owning component has unmounted.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use leptos::prelude::*;

use crate::net::identity::{
    AuthSubscription, IdentityProvider, SharedIdentityProvider, SharedUserLinkStore, SubscriptionId,
};
use crate::net::types::{AuthChange, Session, User};
use crate::state::auth::AuthState;

/// Observer invoked with every committed state.
pub type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(u64);

pub struct SessionStore {
    provider: SharedIdentityProvider,
    links: Option<SharedUserLinkStore>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: AuthState,
    generation: u64,
    alive: bool,
    subscription: Option<SubscriptionId>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    linked: HashSet<String>,
}

enum Commit {
    Dead,
    Applied(Option<User>),
}

/// Releases the provider subscription when the run loop exits or is dropped.
struct SubscriptionRelease<'a> {
    provider: &'a dyn IdentityProvider,
    id: SubscriptionId,
}

impl Drop for SubscriptionRelease<'_> {
    fn drop(&mut self) {
        self.provider.unsubscribe(self.id);
    }
}

impl SessionStore {
    pub fn new(provider: SharedIdentityProvider, links: Option<SharedUserLinkStore>) -> Self {
        Self {
            provider,
            links,
            inner: Mutex::new(Inner {
                state: AuthState::default(),
                generation: 0,
                alive: true,
                subscription: None,
                listeners: Vec::new(),
                next_listener: 0,
                linked: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> AuthState {
        self.lock().state.clone()
    }

    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    pub fn subscribe(&self, listener: Listener) -> ListenerId {
        let mut inner = self.lock();
        inner.next_listener += 1;
        let id = ListenerId(inner.next_listener);
        inner.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.lock().listeners.retain(|(lid, _)| *lid != id);
    }

    /// Bootstrap, then apply provider notifications until torn down.
    pub async fn run(&self) {
        let Commit::Applied(fetched_user) = self.bootstrap().await else {
            return;
        };
        let Some(mut subscription) = self.attach() else {
            return;
        };
        let _release = SubscriptionRelease { provider: &*self.provider, id: subscription.id };

        // Changes published while the link runs queue in the subscription.
        if let Some(user) = fetched_user {
            self.backfill_link(&user).await;
        }

        while let Some(change) = subscription.changes.next().await {
            log::debug!("session change: {:?}", change.event);
            match self.commit(change.session) {
                Commit::Dead => break,
                Commit::Applied(Some(user)) => self.backfill_link(&user).await,
                Commit::Applied(None) => {}
            }
        }
    }

    /// Apply a session transition directly.
    ///
    /// Returns `false` if the store has been torn down.
    pub fn update(&self, change: AuthChange) -> bool {
        matches!(self.commit(change.session), Commit::Applied(_))
    }

    /// Stop committing state and release the provider subscription.
    pub fn teardown(&self) {
        let subscription = {
            let mut inner = self.lock();
            inner.alive = false;
            inner.listeners.clear();
            inner.subscription.take()
        };
        if let Some(id) = subscription {
            self.provider.unsubscribe(id);
        }
    }

    async fn bootstrap(&self) -> Commit {
        let started_at = self.lock().generation;
        let fetched = match self.provider.get_session().await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("session fetch failed, treating as signed out: {e}");
                None
            }
        };
        self.commit_fetch(started_at, fetched)
    }

    fn attach(&self) -> Option<AuthSubscription> {
        let subscription = self.provider.on_auth_state_change();
        let mut inner = self.lock();
        if !inner.alive {
            drop(inner);
            self.provider.unsubscribe(subscription.id);
            return None;
        }
        inner.subscription = Some(subscription.id);
        Some(subscription)
    }

    fn commit(&self, session: Option<Session>) -> Commit {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            if !inner.alive {
                return Commit::Dead;
            }
            inner.generation += 1;
            inner.state.session = session;
            inner.state.loading = false;
            (inner.state.clone(), listeners_of(&inner))
        };
        broadcast(&listeners, &snapshot);
        Commit::Applied(snapshot.user().cloned())
    }

    fn commit_fetch(&self, started_at: u64, fetched: Option<Session>) -> Commit {
        let (snapshot, listeners, fresh) = {
            let mut inner = self.lock();
            if !inner.alive {
                return Commit::Dead;
            }
            let fresh = inner.generation == started_at;
            if fresh {
                inner.state.session = fetched;
            } else {
                log::debug!("discarding stale session fetch");
            }
            inner.generation += 1;
            inner.state.loading = false;
            (inner.state.clone(), listeners_of(&inner), fresh)
        };
        broadcast(&listeners, &snapshot);
        Commit::Applied(if fresh { snapshot.user().cloned() } else { None })
    }

    /// Link `user` to the internal record sharing its e-mail if that record
    /// has no identity yet. Failures are logged and dropped; the link is
    /// tried again on the next session carrying the same user.
    async fn backfill_link(&self, user: &User) {
        let Some(links) = self.links.as_ref() else {
            return;
        };
        let Some(email) = user.email.as_deref() else {
            return;
        };
        if self.lock().linked.contains(&user.id) {
            return;
        }

        let settled = match links.find_by_email(email).await {
            Ok(Some(record)) if record.auth_user_id.is_none() => {
                match links.link_identity(email, &user.id).await {
                    Ok(()) => {
                        log::info!("linked identity {} to user record {}", user.id, record.id);
                        true
                    }
                    Err(e) => {
                        log::warn!("identity link failed for {email}: {e}");
                        false
                    }
                }
            }
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                log::warn!("user record lookup failed for {email}: {e}");
                false
            }
        };
        if settled {
            self.lock().linked.insert(user.id.clone());
        }
    }
}

fn listeners_of(inner: &Inner) -> Vec<Listener> {
    inner.listeners.iter().map(|(_, l)| l.clone()).collect()
}

fn broadcast(listeners: &[Listener], state: &AuthState) {
    for listener in listeners {
        listener(state);
    }
}

/// Create the session store for the current owner and mirror it into `auth`.
///
/// The store runs only in the browser; during SSR `auth` stays in its
/// loading state. The store is torn down when the owner is cleaned up.
pub fn install_session_store(
    auth: RwSignal<AuthState>,
    provider: SharedIdentityProvider,
    links: Option<SharedUserLinkStore>,
) -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::new(provider, links));
    store.subscribe(Arc::new(move |state: &AuthState| auth.set(state.clone())));

    #[cfg(feature = "hydrate")]
    {
        let running = store.clone();
        leptos::task::spawn_local(async move { running.run().await });
    }

    let owned = store.clone();
    on_cleanup(move || owned.teardown());
    store
}
