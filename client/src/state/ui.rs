//! Local UI chrome state (sidebar, theme).
//!
//! DESIGN
//! ======
//! Keeps presentation concerns out of auth state so the layout shell can size
//! itself without touching the session.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use crate::util::{dark_mode, ui_persistence};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    pub sidebar_collapsed: bool,
}

impl UiState {
    /// Restore persisted chrome preferences.
    pub fn restore() -> Self {
        Self {
            dark_mode: dark_mode::read_preference(),
            sidebar_collapsed: ui_persistence::load_json(ui_persistence::SIDEBAR_COLLAPSED_KEY).unwrap_or(false),
        }
    }

    /// Flip the sidebar and persist the new value.
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        ui_persistence::save_json(ui_persistence::SIDEBAR_COLLAPSED_KEY, &self.sidebar_collapsed);
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = dark_mode::toggle(self.dark_mode);
    }
}
