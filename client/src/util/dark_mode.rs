//! Dark-mode preference for the dashboard chrome.
//!
//! The saved choice lives under [`DARK_MODE_KEY`] through the shared
//! `ui_persistence` helpers. Without one, the OS `prefers-color-scheme`
//! setting decides. The active theme is exposed to CSS as
//! `<html data-theme="dark|light">`.

#[cfg(test)]
#[path = "dark_mode_test.rs"]
mod dark_mode_test;

use crate::util::ui_persistence;

pub const DARK_MODE_KEY: &str = "scorecard.dark";

pub(crate) fn theme_attribute(enabled: bool) -> &'static str {
    if enabled { "dark" } else { "light" }
}

fn system_prefers_dark() -> bool {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .is_some_and(|mq| mq.matches())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        false
    }
}

/// Saved preference, else the system color scheme.
pub fn read_preference() -> bool {
    ui_persistence::load_json::<bool>(DARK_MODE_KEY).unwrap_or_else(system_prefers_dark)
}

/// Set `data-theme` on the document element.
pub fn apply(enabled: bool) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|doc| doc.document_element())
        {
            let _ = root.set_attribute("data-theme", theme_attribute(enabled));
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = enabled;
    }
}

/// Flip the theme, apply it, and save the choice.
pub fn toggle(current: bool) -> bool {
    let next = !current;
    apply(next);
    ui_persistence::save_json(DARK_MODE_KEY, &next);
    next
}
