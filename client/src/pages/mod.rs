//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration; access control is applied once
//! by the route guard around the router outlet.

pub mod home;
pub mod login;
pub mod section;
