//! Inbound event handlers: apply socket events to the conversation stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! Events are applied strictly in arrival order off the single inbound
//! stream each view owns; no reordering or coalescing happens here. These
//! functions are pure over `&mut` state so the whole presence/notification
//! path runs under native tests.

#[cfg(test)]
#[path = "socket_events_test.rs"]
mod socket_events_test;

use crate::net::socket_parse::{normalize_message, parse_send_ack, parse_status_change};
use crate::net::types::ChatEvent;
use crate::state::admin_chat::AdminChatState;
use crate::state::chat::ChatState;

/// Apply one inbound event to the investor store.
///
/// Returns `true` when the event was recognized and consumed.
pub fn apply_user_event(event: &ChatEvent, self_user_id: &str, chat: &mut ChatState) -> bool {
    match event.event.as_str() {
        "new_message" => {
            if let Some(message) = normalize_message(&event.data) {
                if chat.accepts_inbound(&message, self_user_id) {
                    chat.append(message);
                }
            }
            true
        }
        "ack" => {
            if let (Some(seq), Some(ack)) = (event.seq, parse_send_ack(&event.data)) {
                chat.resolve_send(seq, &ack, self_user_id);
            }
            true
        }
        _ => false,
    }
}

/// Apply one inbound event to the admin store.
///
/// `new_message` always refreshes the roster preview; it reaches the visible
/// transcript only when it belongs to the selected conversation.
/// `user_status_change` updates presence for known roster entries only.
pub fn apply_admin_event(event: &ChatEvent, admin_id: &str, admin: &mut AdminChatState) -> bool {
    match event.event.as_str() {
        "new_message" => {
            if let Some(message) = normalize_message(&event.data) {
                admin.apply_new_message(message);
            }
            true
        }
        "user_status_change" => {
            if let Some((user_id, is_online)) = parse_status_change(&event.data) {
                admin.apply_status_change(&user_id, is_online);
            }
            true
        }
        "ack" => {
            if let (Some(seq), Some(ack)) = (event.seq, parse_send_ack(&event.data)) {
                admin.resolve_send(seq, &ack, admin_id);
            }
            true
        }
        _ => false,
    }
}
