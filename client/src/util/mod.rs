//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns and pure decision
//! logic from page and component code to improve reuse and testability.

pub mod auth;
pub mod color;
pub mod dark_mode;
pub mod layout;
pub mod nav;
pub mod quarter;
pub mod ui_persistence;
