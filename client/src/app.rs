//! Root application component with routing and context providers.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::{layout_shell::LayoutShell, route_guard::AuthGuard};
use crate::config::ClientConfig;
use crate::net::identity::{SharedIdentityProvider, SharedUserLinkStore};
use crate::net::supabase::{SupabaseAuth, SupabaseUsers};
use crate::pages::{home::HomePage, login::LoginPage, section::SectionPage};
use crate::state::{auth::AuthState, session::install_session_store, ui::UiState};
use crate::util::dark_mode;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Owns the session store and provides auth, UI, config and identity-provider
/// contexts to everything below it.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::load();
    let provider: SharedIdentityProvider = Arc::new(SupabaseAuth::new(config.clone()));
    let links: SharedUserLinkStore = Arc::new(SupabaseUsers::new(config.clone()));

    let auth = RwSignal::new(AuthState::default());
    let ui = RwSignal::new(UiState::default());

    provide_context(auth);
    provide_context(ui);
    provide_context(config);
    provide_context(provider.clone());

    install_session_store(auth, provider, Some(links));

    // Browser-only preferences are applied after hydration to keep the SSR
    // markup deterministic.
    Effect::new(move || {
        let restored = UiState::restore();
        dark_mode::apply(restored.dark_mode);
        ui.set(restored);
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/scorecard.css"/>
        <Title text="Balanced Scorecard"/>

        <Router>
            <LayoutShell>
                <AuthGuard>
                    <Routes fallback=|| "Page not found.".into_view()>
                        <Route path=StaticSegment("login") view=LoginPage/>
                        <Route path=StaticSegment("") view=HomePage/>
                        <Route path=ParamSegment("section") view=SectionPage/>
                    </Routes>
                </AuthGuard>
            </LayoutShell>
        </Router>
    }
}
