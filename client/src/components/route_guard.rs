//! Client-side route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps the route outlet. Decides per render whether to show the route, a
//! loading placeholder, or nothing, and issues login/root redirects once the
//! initial session check has resolved. UX only: the backends still enforce
//! access on every request.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::auth::AuthState;
use crate::util::auth::{GuardPhase, GuardView, RedirectLatch, is_login_route};

#[component]
pub fn AuthGuard(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let pathname = use_location().pathname;
    let navigate = use_navigate();
    let latch = StoredValue::new(RedirectLatch::default());

    let phase = Memo::new(move |_| {
        let on_login = is_login_route(&pathname.get());
        auth.with(|state| GuardPhase::from_state(state, on_login))
    });

    Effect::new(move || {
        let current = phase.get();
        let path = pathname.get();
        let target = latch.try_update_value(|l| l.next_redirect(current, &path)).flatten();
        if let Some(target) = target {
            log::debug!("route guard: {path} -> {target}");
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    move || match phase.get().view() {
        GuardView::Loading => view! {
            <div class="route-guard__loading" aria-busy="true">
                <span class="route-guard__spinner"></span>
            </div>
        }
        .into_any(),
        GuardView::Children => children().into_any(),
        GuardView::Nothing => ().into_any(),
    }
}
