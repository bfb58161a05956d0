//! Collapsible navigation sidebar.
//!
//! ARCHITECTURE
//! ============
//! Links to each dashboard section, hosts the theme toggle and sign-out. The
//! collapsed flag lives in `UiState` so the layout shell can size the content
//! area from the same source.

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::state::auth::AuthState;
use crate::state::ui::UiState;
use crate::util::layout::sidebar_width_px;
use crate::util::nav::{Section, section_for_path};

#[component]
pub fn Sidebar() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let ui = expect_context::<RwSignal<UiState>>();
    let pathname = use_location().pathname;
    #[cfg(feature = "hydrate")]
    let provider = expect_context::<crate::net::identity::SharedIdentityProvider>();

    let signing_out = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let collapsed = move || ui.with(|u| u.sidebar_collapsed);

    let on_sign_out = move |_| {
        if signing_out.get_untracked() {
            return;
        }
        #[cfg(feature = "hydrate")]
        {
            signing_out.set(true);
            error.set(None);
            let provider = provider.clone();
            leptos::task::spawn_local(async move {
                if let Err(e) = crate::net::api::sign_out(provider.as_ref()).await {
                    error.set(Some(e));
                }
                signing_out.set(false);
            });
        }
    };

    let links = Section::ALL
        .into_iter()
        .map(move |section| {
            let class = move || {
                if section_for_path(&pathname.get()) == Some(section) {
                    "sidebar__link sidebar__link--active"
                } else {
                    "sidebar__link"
                }
            };
            view! {
                <a href=section.path() class=class title=section.label()>
                    <span class="sidebar__glyph">{section.glyph()}</span>
                    <Show when=move || !collapsed()>
                        <span class="sidebar__label">{section.label()}</span>
                    </Show>
                </a>
            }
        })
        .collect_view();

    view! {
        <aside
            class=move || if collapsed() { "sidebar sidebar--collapsed" } else { "sidebar" }
            style=move || format!("width: {}px;", sidebar_width_px(collapsed()))
        >
            <div class="sidebar__header">
                <a href="/" class="sidebar__brand">{move || if collapsed() { "BSC" } else { "Scorecard" }}</a>
                <button
                    class="btn sidebar__toggle"
                    title="Toggle sidebar"
                    on:click=move |_| ui.update(UiState::toggle_sidebar)
                >
                    {move || if collapsed() { "»" } else { "«" }}
                </button>
            </div>

            <nav class="sidebar__nav">{links}</nav>

            <div class="sidebar__footer">
                <button
                    class="btn sidebar__theme"
                    title="Toggle dark mode"
                    on:click=move |_| ui.update(UiState::toggle_dark_mode)
                >
                    {move || if ui.with(|u| u.dark_mode) { "☀" } else { "☾" }}
                </button>
                <Show when=move || !collapsed()>
                    <span class="sidebar__user">{move || auth.with(AuthState::display_name)}</span>
                </Show>
                <button class="btn sidebar__sign-out" on:click=on_sign_out disabled=move || signing_out.get()>
                    "Sign out"
                </button>
                <Show when=move || error.get().is_some()>
                    <p class="sidebar__error">{move || error.get().unwrap_or_default()}</p>
                </Show>
            </div>
        </aside>
    }
}
