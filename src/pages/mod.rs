//! Routed page components.

pub mod admin_chat;
pub mod support_chat;
