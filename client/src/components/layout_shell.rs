//! Page chrome: sidebar plus the offset main content area.

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::components::sidebar::Sidebar;
use crate::config::ClientConfig;
use crate::state::ui::UiState;
use crate::util::auth::is_login_route;
use crate::util::color::derive_theme;
use crate::util::layout::{content_style, sidebar_visible};

/// Positions the sidebar and sizes `<main>` from sidebar and route state.
#[component]
pub fn LayoutShell(children: Children) -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();
    let config = expect_context::<ClientConfig>();
    let pathname = use_location().pathname;

    let on_login = Memo::new(move |_| is_login_route(&pathname.get()));
    let theme_vars = derive_theme(&config.brand_color).css_vars();
    let main_style = move || content_style(on_login.get(), ui.with(|u| u.sidebar_collapsed));

    view! {
        <div class="layout-shell" style=theme_vars>
            <Show when=move || sidebar_visible(on_login.get())>
                <Sidebar/>
            </Show>
            <main class="layout-shell__main" style=main_style>
                {children()}
            </main>
        </div>
    }
}
