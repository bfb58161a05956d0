//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by concern (`auth`, `session`, `ui`) so components depend
//! on small focused models.

pub mod auth;
pub mod session;
pub mod ui;
