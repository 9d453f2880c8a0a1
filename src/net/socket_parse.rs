//! Normalization of raw socket/REST payloads into strict internal types.
//!
//! ERROR HANDLING
//! ==============
//! Server records routinely arrive with fields missing. Every absence is
//! recovered locally by defaulting (`body` → `"[No content]"`, `is_read` →
//! `false`, `sender_role` → `user`); only records without a server-assigned
//! id are dropped. Nothing here propagates an error.

#[cfg(test)]
#[path = "socket_parse_test.rs"]
mod socket_parse_test;

use crate::net::types::{ChatMessage, RosterEntry, SenderRole, NO_CONTENT, PLACEHOLDER_AVATAR};

/// Outcome of a `send_message` acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendAck {
    /// Server stored the message and assigned it an id and timestamp.
    Accepted {
        id: String,
        body: String,
        created_at: String,
    },
    /// Server reported `success: false`.
    Rejected,
}

/// Normalize one raw message record. Returns `None` when the record has no
/// server-assigned id.
pub fn normalize_message(data: &serde_json::Value) -> Option<ChatMessage> {
    let id = data.get("id").and_then(serde_json::Value::as_str)?.to_owned();

    Some(ChatMessage {
        id,
        body: body_or_placeholder(pick_str(data, &["message", "body"])),
        created_at: pick_str(data, &["created_at"]).unwrap_or_default().to_owned(),
        is_read: data
            .get("is_read")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false),
        sender_role: role_from_value(data.get("sender_role")),
        sender_id: owned_str(data, "sender_id"),
        recipient_id: owned_str(data, "recipient_id"),
        user_id: owned_str(data, "user_id"),
    })
}

/// Extract the message list from a history response, which the server sends
/// either as `{messages: [...]}` or as a bare array. Invalid records are
/// skipped.
pub fn messages_from_response(data: &serde_json::Value) -> Vec<ChatMessage> {
    let rows = data
        .get("messages")
        .and_then(serde_json::Value::as_array)
        .or_else(|| data.as_array());
    let Some(rows) = rows else {
        return Vec::new();
    };
    rows.iter().filter_map(normalize_message).collect()
}

/// Normalize one raw roster record. Returns `None` without a usable id.
pub fn normalize_roster_entry(data: &serde_json::Value) -> Option<RosterEntry> {
    let id = pick_str(data, &["user_id", "id"])?.to_owned();
    let email = pick_str(data, &["email"]).unwrap_or_default().to_owned();

    Some(RosterEntry {
        name: display_name(pick_str(data, &["name"]), &email),
        avatar: pick_str(data, &["avatar"])
            .filter(|s| !s.is_empty())
            .unwrap_or(PLACEHOLDER_AVATAR)
            .to_owned(),
        is_online: data
            .get("is_online")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false),
        last_message: pick_str(data, &["last_message"]).unwrap_or_default().to_owned(),
        last_message_at: pick_str(data, &["last_message_at"]).unwrap_or_default().to_owned(),
        unread: 0,
        id,
        email,
    })
}

/// Parse a `user_status_change` payload into `(user_id, is_online)`.
pub fn parse_status_change(data: &serde_json::Value) -> Option<(String, bool)> {
    let user_id = pick_str(data, &["userId", "user_id"])?.to_owned();
    let is_online = data
        .get("isOnline")
        .or_else(|| data.get("is_online"))
        .and_then(serde_json::Value::as_bool)?;
    Some((user_id, is_online))
}

/// Parse a `send_message` acknowledgement payload.
///
/// Returns `None` when the payload has no recognizable shape at all, in
/// which case the pending send keeps waiting for its timeout.
pub fn parse_send_ack(data: &serde_json::Value) -> Option<SendAck> {
    let success = data.get("success").and_then(serde_json::Value::as_bool)?;
    if !success {
        return Some(SendAck::Rejected);
    }

    let message = data.get("message")?;
    let id = message.get("id").and_then(serde_json::Value::as_str)?.to_owned();
    Some(SendAck::Accepted {
        id,
        body: body_or_placeholder(pick_str(message, &["message", "body"])),
        created_at: pick_str(message, &["created_at"]).unwrap_or_default().to_owned(),
    })
}

/// Display name fallback chain: explicit name, email local-part, `"Unknown"`.
pub(crate) fn display_name(name: Option<&str>, email: &str) -> String {
    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        return name.to_owned();
    }
    match email.split('@').next().filter(|p| !p.is_empty()) {
        Some(local) => local.to_owned(),
        None => "Unknown".to_owned(),
    }
}

fn body_or_placeholder(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|b| !b.is_empty()) {
        Some(body) => body.to_owned(),
        None => NO_CONTENT.to_owned(),
    }
}

fn role_from_value(value: Option<&serde_json::Value>) -> SenderRole {
    match value.and_then(serde_json::Value::as_str) {
        Some("admin") => SenderRole::Admin,
        _ => SenderRole::User,
    }
}

fn owned_str(data: &serde_json::Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

fn pick_str<'a>(data: &'a serde_json::Value, keys: &[&str]) -> Option<&'a str> {
    for key in keys {
        if let Some(value) = data.get(key).and_then(serde_json::Value::as_str) {
            return Some(value);
        }
    }
    None
}
