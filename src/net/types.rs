//! Shared wire-protocol DTOs for the chat client/server boundary.
//!
//! DESIGN
//! ======
//! Raw socket and REST payloads are duck-typed on the server side; everything
//! here is the *strict* internal shape produced by `socket_parse`
//! normalization. Rendering and store code only ever sees these types.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Body shown when the server returns a message record with no content.
pub const NO_CONTENT: &str = "[No content]";

/// Avatar used when a roster record carries no avatar URL.
pub const PLACEHOLDER_AVATAR: &str = "/placeholder-user.jpg";

/// JSON envelope for every event exchanged over the chat socket.
///
/// `seq` correlates a `send_message` emission with its `ack` reply; all
/// other events omit it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Event name (e.g. `"new_message"`, `"user_status_change"`, `"ack"`).
    pub event: String,
    /// Acknowledgement correlation number, present on `send_message`/`ack`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    /// Event payload; shape depends on `event`.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ChatEvent {
    /// Build an event without an ack correlation number.
    pub fn new(event: &str, data: serde_json::Value) -> Self {
        Self { event: event.to_owned(), seq: None, data }
    }
}

/// Who authored a message. Closed set; styling, alignment, and the
/// `"(You)"` annotation all match on this exhaustively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    /// An investor (the dashboard side of the conversation).
    #[default]
    User,
    /// A support administrator.
    Admin,
}

impl SenderRole {
    /// Wire spelling of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// One normalized chat utterance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned identifier.
    pub id: String,
    /// Message text; never empty — falls back to [`NO_CONTENT`].
    pub body: String,
    /// Server timestamp, UTC ISO 8601. Display conversion happens in
    /// `util::time` only.
    pub created_at: String,
    /// Read flag; self-authored messages are always `true`.
    pub is_read: bool,
    /// Author role.
    pub sender_role: SenderRole,
    /// Author identifier, when the server includes one.
    pub sender_id: Option<String>,
    /// Addressee identifier, when the server includes one.
    pub recipient_id: Option<String>,
    /// Investor the message belongs to — the conversation key on the
    /// admin side.
    pub user_id: Option<String>,
}

/// One investor known to support (admin-side roster entry).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Investor user id.
    pub id: String,
    /// Account email, possibly empty.
    pub email: String,
    /// Display name derived from name or email local-part.
    pub name: String,
    /// Avatar URL with [`PLACEHOLDER_AVATAR`] fallback.
    pub avatar: String,
    /// Live presence, mutated by `user_status_change` events.
    pub is_online: bool,
    /// Preview of the most recent message in the conversation.
    pub last_message: String,
    /// UTC timestamp of the most recent message, possibly empty.
    pub last_message_at: String,
    /// Messages received for this conversation while it was not selected.
    pub unread: u32,
}

/// The authenticated session as returned by `/api/auth/session`.
///
/// Token issuance is out of scope for this client; the chat core only
/// attaches `access_token` to every connection and request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Identifier used for room membership and message addressing.
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Role deciding which chat view this session may mount.
    #[serde(default)]
    pub role: SenderRole,
    /// Bearer credential attached to REST calls and the socket connect URL.
    pub access_token: String,
}
