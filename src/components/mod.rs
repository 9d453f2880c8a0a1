//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render chat chrome from props owned by the page that mounts
//! them; conversation stores stay page-local and are never shared through
//! context.

pub mod connection_badge;
pub mod message_bubble;
pub mod roster_panel;
