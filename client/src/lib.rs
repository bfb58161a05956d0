//! # client
//!
//! Leptos + WASM front-end for the balanced-scorecard dashboard.
//!
//! This crate holds the session store, the client-side route guard, the
//! layout shell, pages, and the Supabase identity-provider client. The root
//! `scorecard` binary links it with the `ssr` feature for server rendering;
//! the browser bundle is built with `hydrate`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
