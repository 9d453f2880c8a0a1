//! Investor-side conversation store.
//!
//! DESIGN
//! ======
//! The investor has exactly one conversation (with support), so the store is
//! a single append-only message list plus the send pipeline and connection
//! lifecycle fields. It is owned by the page that created it and mutated only
//! through these methods, which keeps every transition natively testable.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use crate::net::socket_parse::SendAck;
use crate::net::types::{ChatMessage, SenderRole};

/// Chat socket lifecycle state, one instance per mounted view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Handshake in progress. Initial state, and also shown pre-hydration.
    #[default]
    Connecting,
    /// Socket open and authenticated; sending is allowed.
    Connected,
    /// Socket closed or retry budget exhausted; sending is disabled.
    Disconnected,
}

/// A `send_message` emission awaiting its acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSend {
    /// Correlation number carried by the outbound event and its ack.
    pub seq: u64,
    /// Body as emitted, kept for the confirmed append.
    pub body: String,
}

/// Investor chat state: message list, draft input, and send pipeline.
#[derive(Clone, Debug)]
pub struct ChatState {
    /// Conversation transcript in arrival order. Append-only; never re-sorted.
    pub messages: Vec<ChatMessage>,
    /// Current text in the input box. Cleared only on acknowledged sends.
    pub draft: String,
    /// Socket lifecycle state driving the status badge and input gating.
    pub connection_status: ConnectionStatus,
    /// True until the initial history fetch completes or fails.
    pub loading: bool,
    /// History fetch failure, rendered as an inline error panel.
    pub error: Option<String>,
    /// Last send failure, rendered as a dismissable notice.
    pub send_error: Option<String>,
    /// Outbound message awaiting acknowledgement, if any.
    pub pending_send: Option<PendingSend>,
    next_seq: u64,
}

impl Default for ChatState {
    /// Fresh store for a newly mounted view: history loading, socket
    /// connecting, nothing pending.
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            draft: String::new(),
            connection_status: ConnectionStatus::default(),
            loading: true,
            error: None,
            send_error: None,
            pending_send: None,
            next_seq: 0,
        }
    }
}

impl ChatState {
    /// Replace the transcript with freshly loaded history.
    pub fn seed(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.loading = false;
        self.error = None;
    }

    /// Record a failed history fetch. The transcript is left untouched —
    /// never partially seeded — and the error panel replaces the loading
    /// state.
    pub fn fail_load(&mut self, reason: &str) {
        self.loading = false;
        self.error = Some(reason.to_owned());
    }

    /// Append one message to the end of the transcript.
    ///
    /// No dedup by id is performed; the transport is trusted to deliver each
    /// message once.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Filtering policy for inbound `new_message` events: accept only
    /// admin-authored messages or messages addressed to this viewer, even
    /// though the socket is already subscribed to a personal room.
    #[must_use]
    pub fn accepts_inbound(&self, message: &ChatMessage, self_user_id: &str) -> bool {
        message.sender_role == SenderRole::Admin
            || message.user_id.as_deref() == Some(self_user_id)
    }

    /// Start an acknowledgement-gated send. Records the pending body and
    /// returns the correlation number to emit. The draft is left intact
    /// until the ack confirms.
    pub fn begin_send(&mut self, body: String) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.send_error = None;
        self.pending_send = Some(PendingSend { seq, body });
        seq
    }

    /// Resolve a pending send from its acknowledgement. On success the
    /// server-confirmed message is appended (`is_read: true`, own role) and
    /// the draft is cleared; on rejection the draft is kept for resubmission.
    ///
    /// Acks whose `seq` does not match the pending send are ignored.
    pub fn resolve_send(&mut self, seq: u64, ack: &SendAck, self_user_id: &str) {
        if self.pending_send.as_ref().map(|p| p.seq) != Some(seq) {
            return;
        }
        self.pending_send = None;

        match ack {
            SendAck::Accepted { id, body, created_at } => {
                self.append(ChatMessage {
                    id: id.clone(),
                    body: body.clone(),
                    created_at: created_at.clone(),
                    is_read: true,
                    sender_role: SenderRole::User,
                    sender_id: Some(self_user_id.to_owned()),
                    recipient_id: None,
                    user_id: Some(self_user_id.to_owned()),
                });
                self.draft.clear();
                self.send_error = None;
            }
            SendAck::Rejected => {
                self.send_error = Some("Message was not delivered".to_owned());
            }
        }
    }

    /// Fail a pending send (emit error or ack timeout). The draft is kept.
    /// No-ops when `seq` no longer matches the pending send.
    pub fn fail_send(&mut self, seq: u64, reason: &str) {
        if self.pending_send.as_ref().map(|p| p.seq) != Some(seq) {
            return;
        }
        self.pending_send = None;
        self.send_error = Some(reason.to_owned());
    }

    /// Whether the input should accept a send action right now.
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
            && !self.draft.trim().is_empty()
            && self.pending_send.is_none()
    }
}
