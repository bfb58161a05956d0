//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render dashboard chrome while reading/writing shared state from
//! Leptos context providers.

pub mod layout_shell;
pub mod route_guard;
pub mod sidebar;
