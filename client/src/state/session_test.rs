use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::executor::{LocalPool, block_on};
use futures::task::{LocalSpawnExt, noop_waker};

use super::*;
use crate::net::api;
use crate::net::identity::AuthError;
use crate::net::test_support::{FakeLinks, FakeProvider, session_for};
use crate::util::auth::{GuardPhase, GuardView, LOGIN_PATH, ROOT_PATH, RedirectLatch};

fn recorder(store: &SessionStore) -> Arc<Mutex<Vec<AuthState>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(Arc::new(move |state: &AuthState| sink.lock().unwrap().push(state.clone())));
    seen
}

fn spawn_run(pool: &LocalPool, store: &Arc<SessionStore>) -> Arc<AtomicBool> {
    let done = Arc::new(AtomicBool::new(false));
    let flag = done.clone();
    let store = store.clone();
    pool.spawner()
        .spawn_local(async move {
            store.run().await;
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();
    done
}

// =============================================================
// Bootstrap
// =============================================================

#[test]
fn starts_loading_without_session() {
    let store = SessionStore::new(FakeProvider::answering(Ok(None)), None);
    assert_eq!(store.snapshot(), AuthState::default());
    assert!(store.is_alive());
}

#[test]
fn bootstrap_without_session_clears_loading_once() {
    let provider = FakeProvider::answering(Ok(None));
    let store = Arc::new(SessionStore::new(provider.clone(), None));
    let seen = recorder(&store);
    let mut pool = LocalPool::new();
    let done = spawn_run(&pool, &store);

    pool.run_until_stalled();

    assert_eq!(store.snapshot(), AuthState { session: None, loading: false });
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
    assert!(!done.load(Ordering::SeqCst));
}

#[test]
fn bootstrap_applies_fetched_session() {
    let session = session_for("u1", Some("a@b.com"));
    let store = Arc::new(SessionStore::new(FakeProvider::answering(Ok(Some(session.clone()))), None));
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);

    pool.run_until_stalled();

    assert_eq!(store.snapshot(), AuthState { session: Some(session), loading: false });
}

#[test]
fn failed_fetch_is_treated_as_signed_out() {
    let provider = FakeProvider::answering(Err(AuthError::Network("offline".to_owned())));
    let store = Arc::new(SessionStore::new(provider, None));
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);

    pool.run_until_stalled();

    assert_eq!(store.snapshot(), AuthState { session: None, loading: false });
}

#[test]
fn subscribes_only_after_fetch_resolves() {
    let (provider, gate) = FakeProvider::gated();
    let store = Arc::new(SessionStore::new(provider.clone(), None));
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);

    pool.run_until_stalled();
    assert_eq!(provider.hub.subscriber_count(), 0);
    assert!(store.snapshot().loading);

    gate.send(Ok(None)).unwrap();
    pool.run_until_stalled();
    assert_eq!(provider.hub.subscriber_count(), 1);
    assert!(!store.snapshot().loading);
}

// =============================================================
// Change notifications
// =============================================================

#[test]
fn notifications_replace_session() {
    let provider = FakeProvider::answering(Ok(None));
    let store = Arc::new(SessionStore::new(provider.clone(), None));
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);
    pool.run_until_stalled();

    let session = session_for("u1", None);
    provider.hub.publish(&AuthChange::signed_in(session.clone()));
    pool.run_until_stalled();
    assert_eq!(store.snapshot().session, Some(session));

    let refreshed = session_for("u1", Some("new@b.com"));
    provider.hub.publish(&AuthChange::token_refreshed(refreshed.clone()));
    pool.run_until_stalled();
    assert_eq!(store.snapshot().session, Some(refreshed));

    provider.hub.publish(&AuthChange::signed_out());
    pool.run_until_stalled();
    assert_eq!(store.snapshot(), AuthState { session: None, loading: false });
}

#[test]
fn stale_fetch_does_not_overwrite_newer_update() {
    let (provider, gate) = FakeProvider::gated();
    let store = Arc::new(SessionStore::new(provider, None));
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);
    pool.run_until_stalled();

    let newer = session_for("u2", None);
    assert!(store.update(AuthChange::signed_in(newer.clone())));
    gate.send(Ok(None)).unwrap();
    pool.run_until_stalled();

    assert_eq!(store.snapshot(), AuthState { session: Some(newer), loading: false });
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let store = SessionStore::new(FakeProvider::answering(Ok(None)), None);
    let seen = Arc::new(Mutex::new(0_usize));
    let sink = seen.clone();
    let id = store.subscribe(Arc::new(move |_: &AuthState| *sink.lock().unwrap() += 1));
    store.unsubscribe(id);

    store.update(AuthChange::signed_out());

    assert_eq!(*seen.lock().unwrap(), 0);
}

// =============================================================
// Teardown
// =============================================================

#[test]
fn teardown_during_fetch_suppresses_late_result() {
    let (provider, gate) = FakeProvider::gated();
    let store = Arc::new(SessionStore::new(provider.clone(), None));
    let seen = recorder(&store);
    let mut pool = LocalPool::new();
    let done = spawn_run(&pool, &store);
    pool.run_until_stalled();

    store.teardown();
    gate.send(Ok(Some(session_for("u1", None)))).unwrap();
    pool.run_until_stalled();

    assert!(done.load(Ordering::SeqCst));
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(store.snapshot(), AuthState::default());
    assert_eq!(provider.hub.subscriber_count(), 0);
}

#[test]
fn teardown_releases_subscription_and_ends_run() {
    let provider = FakeProvider::answering(Ok(None));
    let store = Arc::new(SessionStore::new(provider.clone(), None));
    let seen = recorder(&store);
    let mut pool = LocalPool::new();
    let done = spawn_run(&pool, &store);
    pool.run_until_stalled();
    assert_eq!(provider.hub.subscriber_count(), 1);

    store.teardown();
    pool.run_until_stalled();

    assert!(done.load(Ordering::SeqCst));
    assert_eq!(provider.hub.subscriber_count(), 0);
    assert!(provider.unsubscribes.load(Ordering::SeqCst) >= 1);

    provider.hub.publish(&AuthChange::signed_in(session_for("u1", None)));
    assert!(!store.update(AuthChange::signed_out()));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn dropping_run_future_releases_subscription() {
    let provider = FakeProvider::answering(Ok(None));
    let store = SessionStore::new(provider.clone(), None);
    {
        let mut running = Box::pin(store.run());
        let waker = noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(running.poll_unpin(&mut cx).is_pending());
        assert_eq!(provider.hub.subscriber_count(), 1);
    }
    assert_eq!(provider.hub.subscriber_count(), 0);
}

// =============================================================
// Backfill link
// =============================================================

fn run_with_links(email: Option<&str>, links: Arc<FakeLinks>) -> (Arc<FakeProvider>, Arc<SessionStore>, LocalPool) {
    let provider = FakeProvider::answering(Ok(Some(session_for("u1", email))));
    let store = Arc::new(SessionStore::new(provider.clone(), Some(links as SharedUserLinkStore)));
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);
    pool.run_until_stalled();
    (provider, store, pool)
}

#[test]
fn links_identity_when_record_is_unlinked() {
    let links = Arc::new(FakeLinks::with_record("a@b.com", None));
    let _run = run_with_links(Some("a@b.com"), links.clone());
    assert_eq!(
        *links.link_calls.lock().unwrap(),
        vec![("a@b.com".to_owned(), "u1".to_owned())]
    );
}

#[test]
fn skips_link_when_record_already_linked() {
    let links = Arc::new(FakeLinks::with_record("a@b.com", Some("other")));
    let _run = run_with_links(Some("a@b.com"), links.clone());
    assert_eq!(links.lookups.load(Ordering::SeqCst), 1);
    assert!(links.link_calls.lock().unwrap().is_empty());
}

#[test]
fn skips_link_when_no_record_matches() {
    let links = Arc::new(FakeLinks::with_record("someone@else.com", None));
    let _run = run_with_links(Some("a@b.com"), links.clone());
    assert!(links.link_calls.lock().unwrap().is_empty());
}

#[test]
fn skips_link_when_user_has_no_email() {
    let links = Arc::new(FakeLinks::with_record("a@b.com", None));
    let _run = run_with_links(None, links.clone());
    assert_eq!(links.lookups.load(Ordering::SeqCst), 0);
}

#[test]
fn link_failure_is_swallowed() {
    let links = Arc::new(FakeLinks { fail_link: true, ..FakeLinks::with_record("a@b.com", None) });
    let (provider, store, _pool) = run_with_links(Some("a@b.com"), links.clone());
    assert_eq!(links.link_calls.lock().unwrap().len(), 1);
    assert!(store.snapshot().is_authenticated());
    assert!(!store.snapshot().loading);
    assert_eq!(provider.hub.subscriber_count(), 1);
}

#[test]
fn lookup_failure_is_swallowed() {
    let links = Arc::new(FakeLinks { fail_lookup: true, ..FakeLinks::default() });
    let (_provider, store, _pool) = run_with_links(Some("a@b.com"), links.clone());
    assert!(links.link_calls.lock().unwrap().is_empty());
    assert!(store.snapshot().is_authenticated());
}

#[test]
fn linked_identity_is_not_looked_up_again() {
    let links = Arc::new(FakeLinks::with_record("a@b.com", None));
    let (provider, _store, mut pool) = run_with_links(Some("a@b.com"), links.clone());

    provider.hub.publish(&AuthChange::token_refreshed(session_for("u1", Some("a@b.com"))));
    provider.hub.publish(&AuthChange::token_refreshed(session_for("u1", Some("a@b.com"))));
    pool.run_until_stalled();

    assert_eq!(links.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(links.link_calls.lock().unwrap().len(), 1);
}

#[test]
fn failed_link_is_retried_on_next_sign_in() {
    let links = Arc::new(FakeLinks { fail_link: true, ..FakeLinks::with_record("a@b.com", None) });
    let (provider, _store, mut pool) = run_with_links(Some("a@b.com"), links.clone());
    assert_eq!(links.link_calls.lock().unwrap().len(), 1);

    provider.hub.publish(&AuthChange::signed_out());
    provider.hub.publish(&AuthChange::signed_in(session_for("u1", Some("a@b.com"))));
    pool.run_until_stalled();

    assert_eq!(links.link_calls.lock().unwrap().len(), 2);
}

#[test]
fn failed_lookup_is_retried_on_next_transition() {
    let links = Arc::new(FakeLinks { fail_lookup: true, ..FakeLinks::with_record("a@b.com", None) });
    let (provider, _store, mut pool) = run_with_links(Some("a@b.com"), links.clone());

    provider.hub.publish(&AuthChange::token_refreshed(session_for("u1", Some("a@b.com"))));
    pool.run_until_stalled();

    assert_eq!(links.lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn sign_out_during_bootstrap_link_is_applied() {
    let (links, release_lookup) = FakeLinks::gated_record("a@b.com", None);
    let links = Arc::new(links);
    let (provider, store, mut pool) = run_with_links(Some("a@b.com"), links.clone());
    assert!(store.snapshot().is_authenticated());
    assert_eq!(provider.hub.subscriber_count(), 1);

    assert_eq!(block_on(api::sign_out(provider.as_ref())), Ok(()));
    release_lookup.send(()).unwrap();
    pool.run_until_stalled();

    assert_eq!(links.link_calls.lock().unwrap().len(), 1);
    assert_eq!(store.snapshot(), AuthState { session: None, loading: false });
}

// =============================================================
// Store + guard scenarios
// =============================================================

#[test]
fn null_session_off_login_goes_from_placeholder_to_single_redirect() {
    let (provider, gate) = FakeProvider::gated();
    let store = Arc::new(SessionStore::new(provider, None));
    let mut latch = RedirectLatch::default();
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);
    pool.run_until_stalled();

    let phase = GuardPhase::from_state(&store.snapshot(), false);
    assert_eq!(phase.view(), GuardView::Loading);
    assert_eq!(latch.next_redirect(phase, "/boards"), None);

    gate.send(Ok(None)).unwrap();
    pool.run_until_stalled();

    let phase = GuardPhase::from_state(&store.snapshot(), false);
    assert_eq!(phase.view(), GuardView::Nothing);
    assert_eq!(latch.next_redirect(phase, "/boards"), Some(LOGIN_PATH));
    assert_eq!(latch.next_redirect(phase, "/boards"), None);
}

#[test]
fn sign_in_on_login_redirects_to_root_after_notification() {
    let provider = FakeProvider::answering(Ok(None));
    let store = Arc::new(SessionStore::new(provider.clone(), None));
    let mut latch = RedirectLatch::default();
    let mut pool = LocalPool::new();
    spawn_run(&pool, &store);
    pool.run_until_stalled();

    let phase = GuardPhase::from_state(&store.snapshot(), true);
    assert_eq!(phase, GuardPhase::UnauthenticatedOnLogin);
    assert_eq!(latch.next_redirect(phase, "/login"), None);

    assert_eq!(block_on(api::sign_in_with_password(provider.as_ref(), "a@b.com", "pw")), Ok(()));
    pool.run_until_stalled();

    let phase = GuardPhase::from_state(&store.snapshot(), true);
    assert_eq!(phase, GuardPhase::AuthenticatedOnLogin);
    assert_eq!(phase.view(), GuardView::Children);
    assert_eq!(latch.next_redirect(phase, "/login"), Some(ROOT_PATH));
}
