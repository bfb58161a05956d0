//! Authenticated landing page: scorecard overview for one quarter.

#[cfg(test)]
#[path = "home_test.rs"]
mod home_test;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::util::nav::Section;
use crate::util::quarter::Quarter;

/// Quarter named by the `q` query parameter, else `fallback`.
pub(crate) fn selected_quarter(raw: Option<&str>, fallback: Option<Quarter>) -> Option<Quarter> {
    raw.and_then(|r| r.parse().ok()).or(fallback)
}

/// Quarter containing today, from the browser clock.
fn current_quarter() -> Option<Quarter> {
    #[cfg(feature = "hydrate")]
    {
        let now = js_sys::Date::new_0();
        let year = i32::try_from(now.get_full_year()).ok()?;
        Quarter::from_month(year, now.get_month() + 1)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

fn quarter_href(quarter: Quarter) -> String {
    format!("/?q={}", quarter.query_value())
}

#[component]
pub fn HomePage() -> impl IntoView {
    let query = use_query_map();
    // Read the clock after hydration so the server and browser render the same
    // markup first.
    let today = RwSignal::new(None::<Quarter>);
    Effect::new(move || today.set(current_quarter()));

    let quarter = Memo::new(move |_| {
        let raw = query.with(|q| q.get("q"));
        selected_quarter(raw.as_deref(), today.get())
    });

    let cards = Section::ALL
        .into_iter()
        .map(|section| {
            view! {
                <a class="home-card" href=section.path()>
                    <span class="home-card__glyph">{section.glyph()}</span>
                    <span class="home-card__label">{section.label()}</span>
                </a>
            }
        })
        .collect_view();

    view! {
        <div class="home-page">
            <header class="home-page__header">
                <h1>"Scorecard overview"</h1>
                {move || match quarter.get() {
                    Some(q) => view! {
                        <div class="home-page__quarter">
                            <a class="btn" href=quarter_href(q.prev())>"‹"</a>
                            <span class="home-page__quarter-label">{q.to_string()}</span>
                            <a class="btn" href=quarter_href(q.next())>"›"</a>
                        </div>
                    }
                    .into_any(),
                    None => view! { <span class="home-page__quarter-label">"All quarters"</span> }.into_any(),
                }}
            </header>
            <div class="home-page__cards">{cards}</div>
        </div>
    }
}
