//! Admin-side conversation store: investor roster plus the visible transcript.
//!
//! DESIGN
//! ======
//! The roster is refreshed by two independent sources — a 30 s REST poll and
//! the live event stream. Precedence is explicit: an entry touched by an
//! event keeps its live fields (presence, preview, unread) through the next
//! poll merge, so polled data never overwrites fresher event data. The
//! reverse never happens.

#[cfg(test)]
#[path = "admin_chat_test.rs"]
mod admin_chat_test;

use std::collections::HashSet;

use crate::net::socket_parse::SendAck;
use crate::net::types::{ChatMessage, RosterEntry, SenderRole};
use crate::state::chat::ConnectionStatus;

/// An admin `send_message` emission awaiting its acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminPendingSend {
    /// Correlation number carried by the outbound event and its ack.
    pub seq: u64,
    /// Body as emitted.
    pub body: String,
    /// Investor the message was addressed to.
    pub recipient_id: String,
}

/// Admin chat state: roster, selected conversation, and send pipeline.
#[derive(Clone, Debug)]
pub struct AdminChatState {
    /// All investors known to support, in roster-fetch order with
    /// event-inserted entries appended.
    pub roster: Vec<RosterEntry>,
    /// Conversation currently shown in the transcript pane.
    pub selected_user_id: Option<String>,
    /// Transcript of the selected conversation only, in arrival order.
    pub messages: Vec<ChatMessage>,
    /// Current text in the input box.
    pub draft: String,
    /// Roster search box contents; filters by name or email.
    pub search_query: String,
    /// Socket lifecycle state.
    pub connection_status: ConnectionStatus,
    /// True until the initial roster fetch completes or fails.
    pub roster_loading: bool,
    /// True while the selected conversation's history fetch is in flight.
    pub messages_loading: bool,
    /// Roster or history fetch failure, rendered as an inline error panel.
    pub error: Option<String>,
    /// Last send or delete failure, rendered as a dismissable notice.
    pub send_error: Option<String>,
    /// Outbound message awaiting acknowledgement, if any.
    pub pending_send: Option<AdminPendingSend>,
    /// Roster ids whose live fields were set by events since the last poll
    /// merge. Those fields survive the next `merge_roster_fetch`.
    event_touched: HashSet<String>,
    next_seq: u64,
}

impl Default for AdminChatState {
    /// Fresh store for a newly mounted view: roster loading, socket
    /// connecting, nothing selected.
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            selected_user_id: None,
            messages: Vec::new(),
            draft: String::new(),
            search_query: String::new(),
            connection_status: ConnectionStatus::default(),
            roster_loading: true,
            messages_loading: false,
            error: None,
            send_error: None,
            pending_send: None,
            event_touched: HashSet::new(),
            next_seq: 0,
        }
    }
}

impl AdminChatState {
    /// Replace the visible transcript with freshly loaded history for the
    /// selected conversation.
    pub fn seed_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.messages_loading = false;
        self.error = None;
    }

    /// Record a failed roster fetch. The roster keeps whatever it already
    /// holds; nothing is partially merged.
    pub fn fail_roster_load(&mut self, reason: &str) {
        self.roster_loading = false;
        self.error = Some(reason.to_owned());
    }

    /// Record a failed history fetch for the selected conversation. The
    /// transcript stays empty rather than partially seeded.
    pub fn fail_messages_load(&mut self, reason: &str) {
        self.messages_loading = false;
        self.error = Some(reason.to_owned());
    }

    /// Merge a polled roster fetch into the live roster.
    ///
    /// Fetched entries set identity fields unconditionally; live fields
    /// (`is_online`, `last_message`, `last_message_at`) are taken from the
    /// fetch only for entries the event stream has not touched since the
    /// previous merge. Unread counts are always preserved, and entries the
    /// fetch does not know about (inserted on first message) are kept.
    pub fn merge_roster_fetch(&mut self, fetched: Vec<RosterEntry>) {
        let mut merged: Vec<RosterEntry> = Vec::with_capacity(fetched.len());
        for mut entry in fetched {
            if let Some(existing) = self.roster.iter().find(|e| e.id == entry.id) {
                entry.unread = existing.unread;
                if self.event_touched.contains(&entry.id) {
                    entry.is_online = existing.is_online;
                    entry.last_message = existing.last_message.clone();
                    entry.last_message_at = existing.last_message_at.clone();
                }
            }
            merged.push(entry);
        }
        for existing in &self.roster {
            if !merged.iter().any(|e| e.id == existing.id) {
                merged.push(existing.clone());
            }
        }
        self.roster = merged;
        self.roster_loading = false;
        self.event_touched.clear();
    }

    /// Apply an inbound `new_message` event.
    ///
    /// Investor-authored messages always refresh the sender's roster preview
    /// (inserting an entry on first message from an unknown sender). The
    /// message is appended to the transcript only when it belongs to the
    /// selected conversation; otherwise the sender's unread count increments.
    pub fn apply_new_message(&mut self, message: ChatMessage) {
        let conversation = message.user_id.clone();

        if message.sender_role == SenderRole::User {
            if let Some(user_id) = conversation.as_deref() {
                self.touch_roster_preview(user_id, &message.body, &message.created_at, true);
                if self.selected_user_id.as_deref() != Some(user_id) {
                    if let Some(entry) = self.roster.iter_mut().find(|e| e.id == user_id) {
                        entry.unread = entry.unread.saturating_add(1);
                    }
                }
            }
        }

        if self.selected_user_id.is_some() && conversation == self.selected_user_id {
            let is_read = message.sender_role == SenderRole::Admin;
            self.messages.push(ChatMessage { is_read, ..message });
        }
    }

    /// Apply a `user_status_change` event. Unknown users are ignored — the
    /// roster fetch, not presence events, decides who is known. Applying the
    /// same event twice is a no-op the second time.
    pub fn apply_status_change(&mut self, user_id: &str, is_online: bool) {
        if let Some(entry) = self.roster.iter_mut().find(|e| e.id == user_id) {
            entry.is_online = is_online;
            self.event_touched.insert(user_id.to_owned());
        }
    }

    /// Select a conversation: clears its unread count and the stale
    /// transcript, and marks history as loading. The caller issues the
    /// actual fetch.
    pub fn select_user(&mut self, user_id: &str) {
        if let Some(entry) = self.roster.iter_mut().find(|e| e.id == user_id) {
            entry.unread = 0;
        }
        self.selected_user_id = Some(user_id.to_owned());
        self.messages.clear();
        self.messages_loading = true;
        self.error = None;
    }

    /// Remove a deleted conversation: drops the roster entry and, when it
    /// was selected, the transcript and selection.
    pub fn remove_conversation(&mut self, user_id: &str) {
        self.roster.retain(|e| e.id != user_id);
        self.event_touched.remove(user_id);
        if self.selected_user_id.as_deref() == Some(user_id) {
            self.selected_user_id = None;
            self.messages.clear();
        }
    }

    /// Start an acknowledgement-gated send to the selected conversation.
    /// Returns the correlation number to emit, or `None` when no
    /// conversation is selected.
    pub fn begin_send(&mut self, body: String) -> Option<u64> {
        let recipient_id = self.selected_user_id.clone()?;
        self.next_seq += 1;
        let seq = self.next_seq;
        self.send_error = None;
        self.pending_send = Some(AdminPendingSend { seq, body, recipient_id });
        Some(seq)
    }

    /// Resolve a pending send from its acknowledgement. On success the
    /// confirmed message lands in the transcript and the recipient's roster
    /// preview updates without waiting for the next poll.
    pub fn resolve_send(&mut self, seq: u64, ack: &SendAck, admin_id: &str) {
        let Some(pending) = self.pending_send.take_if(|p| p.seq == seq) else {
            return;
        };

        match ack {
            SendAck::Accepted { id, body, created_at } => {
                let recipient = pending.recipient_id;
                if self.selected_user_id.as_deref() == Some(recipient.as_str()) {
                    self.messages.push(ChatMessage {
                        id: id.clone(),
                        body: body.clone(),
                        created_at: created_at.clone(),
                        is_read: true,
                        sender_role: SenderRole::Admin,
                        sender_id: Some(admin_id.to_owned()),
                        recipient_id: Some(recipient.clone()),
                        user_id: Some(recipient.clone()),
                    });
                }
                self.touch_roster_preview(&recipient, body, created_at, false);
                self.draft.clear();
                self.send_error = None;
            }
            SendAck::Rejected => {
                self.send_error = Some("Message was not delivered".to_owned());
            }
        }
    }

    /// Fail a pending send (emit error or ack timeout). The draft is kept.
    pub fn fail_send(&mut self, seq: u64, reason: &str) {
        if self.pending_send.as_ref().map(|p| p.seq) != Some(seq) {
            return;
        }
        self.pending_send = None;
        self.send_error = Some(reason.to_owned());
    }

    /// Roster entries matching the search query, by name or email,
    /// case-insensitive.
    #[must_use]
    pub fn filtered_roster(&self) -> Vec<RosterEntry> {
        let query = self.search_query.trim().to_lowercase();
        self.roster
            .iter()
            .filter(|e| {
                query.is_empty()
                    || e.name.to_lowercase().contains(&query)
                    || e.email.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    /// Roster entry for the selected conversation, if any.
    #[must_use]
    pub fn selected_user(&self) -> Option<&RosterEntry> {
        let id = self.selected_user_id.as_deref()?;
        self.roster.iter().find(|e| e.id == id)
    }

    /// Whether the input should accept a send action right now.
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
            && self.selected_user_id.is_some()
            && !self.draft.trim().is_empty()
            && self.pending_send.is_none()
    }

    /// Update a conversation's roster preview from a live message, inserting
    /// a minimal entry when the sender is not yet known.
    fn touch_roster_preview(&mut self, user_id: &str, body: &str, created_at: &str, online: bool) {
        if let Some(entry) = self.roster.iter_mut().find(|e| e.id == user_id) {
            entry.last_message = body.to_owned();
            entry.last_message_at = created_at.to_owned();
            if online {
                entry.is_online = true;
            }
        } else {
            self.roster.push(RosterEntry {
                id: user_id.to_owned(),
                email: String::new(),
                name: "Unknown".to_owned(),
                avatar: crate::net::types::PLACEHOLDER_AVATAR.to_owned(),
                is_online: online,
                last_message: body.to_owned(),
                last_message_at: created_at.to_owned(),
                unread: 0,
            });
        }
        self.event_touched.insert(user_id.to_owned());
    }
}
