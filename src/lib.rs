//! # support-chat
//!
//! Leptos + WASM frontend for the investor support chat: a live WebSocket
//! channel with acknowledgement-gated sends, REST history and roster
//! loading, presence, and an admin console.
//!
//! This crate contains pages, components, application state, network types,
//! and the chat socket client.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered document.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
