//! Section landing pages (Boards, Meetings, Wiki, Team Planner, Projects).
//!
//! The section content itself lives in OpenProject; this page names the
//! section and links to it.

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::config::ClientConfig;
use crate::util::nav::Section;

#[component]
pub fn SectionPage() -> impl IntoView {
    let params = use_params_map();
    let config = expect_context::<ClientConfig>();
    let section = move || params.with(|p| p.get("section")).as_deref().and_then(Section::from_slug);

    move || match section() {
        Some(section) => {
            let external = section.openproject_url(&config.openproject_url);
            view! {
                <section class="section-page">
                    <h1>{section.label()}</h1>
                    <a class="btn section-page__external" href=external target="_blank" rel="noopener">
                        "Open in OpenProject"
                    </a>
                </section>
            }
            .into_any()
        }
        None => view! { <p class="section-page__missing">"Page not found."</p> }.into_any(),
    }
}
