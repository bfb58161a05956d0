//! Layout shell sizing.
//!
//! The main content area sits flush left on the login route and is offset by
//! the sidebar width everywhere else.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

pub const SIDEBAR_COLLAPSED_WIDTH_PX: u32 = 64;
pub const SIDEBAR_EXPANDED_WIDTH_PX: u32 = 256;

pub fn sidebar_visible(on_login: bool) -> bool {
    !on_login
}

pub fn sidebar_width_px(collapsed: bool) -> u32 {
    if collapsed { SIDEBAR_COLLAPSED_WIDTH_PX } else { SIDEBAR_EXPANDED_WIDTH_PX }
}

/// Left offset of the main content area.
pub fn content_offset_px(on_login: bool, sidebar_collapsed: bool) -> u32 {
    if on_login { 0 } else { sidebar_width_px(sidebar_collapsed) }
}

pub fn content_style(on_login: bool, sidebar_collapsed: bool) -> String {
    format!("margin-left: {}px;", content_offset_px(on_login, sidebar_collapsed))
}
