//! Networking modules for the identity provider and auth actions.
//!
//! SYSTEM CONTEXT
//! ==============
//! `identity` defines the provider capabilities, `supabase` implements them
//! over HTTP, `api` exposes the auth actions, and `types` holds the DTOs.

pub mod api;
pub mod identity;
pub mod supabase;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
