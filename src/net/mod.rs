//! Networking modules for the chat core.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` loads history and roster over REST, `socket_client` manages the
//! websocket lifecycle, `socket_parse` normalizes raw payloads at the
//! boundary, `socket_events` applies inbound events to the stores, and
//! `types` defines the strict internal schema.

pub mod api;
pub mod socket_client;
pub mod socket_events;
pub mod socket_parse;
pub mod types;
