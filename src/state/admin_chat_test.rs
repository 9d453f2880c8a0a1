use super::*;
use crate::net::types::PLACEHOLDER_AVATAR;

fn entry(id: &str, name: &str, email: &str) -> RosterEntry {
    RosterEntry {
        id: id.to_owned(),
        email: email.to_owned(),
        name: name.to_owned(),
        avatar: PLACEHOLDER_AVATAR.to_owned(),
        is_online: false,
        last_message: String::new(),
        last_message_at: String::new(),
        unread: 0,
    }
}

fn message_from(user_id: &str, id: &str, body: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_owned(),
        body: body.to_owned(),
        created_at: "2024-01-01T10:00:00Z".to_owned(),
        is_read: false,
        sender_role: SenderRole::User,
        sender_id: Some(user_id.to_owned()),
        recipient_id: None,
        user_id: Some(user_id.to_owned()),
    }
}

fn connected_with_roster(entries: Vec<RosterEntry>) -> AdminChatState {
    let mut state = AdminChatState {
        connection_status: ConnectionStatus::Connected,
        ..AdminChatState::default()
    };
    state.merge_roster_fetch(entries);
    state
}

// =============================================================
// merge_roster_fetch
// =============================================================

#[test]
fn first_merge_populates_roster() {
    let mut state = AdminChatState {
        roster_loading: true,
        ..AdminChatState::default()
    };
    state.merge_roster_fetch(vec![entry("u1", "Alice", "alice@x.com")]);
    assert_eq!(state.roster.len(), 1);
    assert!(!state.roster_loading);
}

#[test]
fn merge_preserves_unread_counts() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.roster[0].unread = 3;

    state.merge_roster_fetch(vec![entry("u1", "Alice", "alice@x.com")]);
    assert_eq!(state.roster[0].unread, 3);
}

#[test]
fn merge_does_not_overwrite_event_touched_live_fields() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.apply_status_change("u1", true);

    // Polled snapshot is staler than the event stream.
    let mut fetched = entry("u1", "Alice", "alice@x.com");
    fetched.is_online = false;
    state.merge_roster_fetch(vec![fetched]);

    assert!(state.roster[0].is_online);
}

#[test]
fn merge_applies_fetched_fields_once_events_quiesce() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.apply_status_change("u1", true);
    state.merge_roster_fetch(vec![entry("u1", "Alice", "alice@x.com")]);

    // No events between merges: the next fetch is authoritative again.
    let mut fetched = entry("u1", "Alice", "alice@x.com");
    fetched.is_online = false;
    fetched.last_message = "polled".to_owned();
    state.merge_roster_fetch(vec![fetched]);

    assert!(!state.roster[0].is_online);
    assert_eq!(state.roster[0].last_message, "polled");
}

#[test]
fn merge_keeps_entries_the_fetch_does_not_know() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.apply_new_message(message_from("u-new", "m1", "hi"));
    assert_eq!(state.roster.len(), 2);

    state.merge_roster_fetch(vec![entry("u1", "Alice", "alice@x.com")]);
    assert_eq!(state.roster.len(), 2);
    assert!(state.roster.iter().any(|e| e.id == "u-new"));
}

#[test]
fn failed_roster_fetch_surfaces_error_and_keeps_roster() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);

    state.fail_roster_load("request failed: 500");

    assert!(!state.roster_loading);
    assert_eq!(state.error.as_deref(), Some("request failed: 500"));
    assert_eq!(state.roster.len(), 1);
}

#[test]
fn failed_conversation_fetch_leaves_transcript_empty() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.select_user("u1");

    state.fail_messages_load("request failed: 500");

    assert!(!state.messages_loading);
    assert_eq!(state.error.as_deref(), Some("request failed: 500"));
    assert!(state.messages.is_empty());
}

// =============================================================
// apply_new_message
// =============================================================

#[test]
fn message_for_selected_conversation_lands_in_transcript() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.select_user("u1");
    state.messages_loading = false;

    state.apply_new_message(message_from("u1", "m1", "hello"));

    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.roster[0].last_message, "hello");
    assert_eq!(state.roster[0].unread, 0);
    assert!(state.roster[0].is_online);
}

#[test]
fn message_for_other_conversation_updates_preview_not_transcript() {
    let mut state = connected_with_roster(vec![
        entry("u1", "Alice", "alice@x.com"),
        entry("u2", "Bob", "bob@x.com"),
    ]);
    state.select_user("u1");
    state.messages_loading = false;

    state.apply_new_message(message_from("u2", "m1", "ping"));

    assert!(state.messages.is_empty());
    let bob = state.roster.iter().find(|e| e.id == "u2").unwrap();
    assert_eq!(bob.last_message, "ping");
    assert_eq!(bob.unread, 1);
    let alice = state.roster.iter().find(|e| e.id == "u1").unwrap();
    assert_eq!(alice.unread, 0);
}

#[test]
fn first_message_from_unknown_sender_inserts_roster_entry() {
    let mut state = connected_with_roster(vec![]);
    state.apply_new_message(message_from("u9", "m1", "hello"));

    assert_eq!(state.roster.len(), 1);
    let inserted = &state.roster[0];
    assert_eq!(inserted.id, "u9");
    assert_eq!(inserted.name, "Unknown");
    assert_eq!(inserted.avatar, PLACEHOLDER_AVATAR);
    assert_eq!(inserted.last_message, "hello");
    assert!(inserted.is_online);
}

#[test]
fn admin_authored_message_does_not_touch_unread() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.select_user("u1");
    state.messages_loading = false;

    let echo = ChatMessage {
        sender_role: SenderRole::Admin,
        ..message_from("u1", "m2", "reply")
    };
    state.apply_new_message(echo);

    assert_eq!(state.messages.len(), 1);
    assert!(state.messages[0].is_read);
    assert_eq!(state.roster[0].unread, 0);
}

// =============================================================
// apply_status_change
// =============================================================

#[test]
fn status_change_updates_known_entry() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.apply_status_change("u1", true);
    assert!(state.roster[0].is_online);
    state.apply_status_change("u1", false);
    assert!(!state.roster[0].is_online);
}

#[test]
fn status_change_is_idempotent() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.apply_status_change("u1", true);
    state.apply_status_change("u1", true);
    assert!(state.roster[0].is_online);
    assert_eq!(state.roster.len(), 1);
}

#[test]
fn status_change_for_unknown_user_is_ignored() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.apply_status_change("ghost", true);
    assert_eq!(state.roster.len(), 1);
}

// =============================================================
// select_user / remove_conversation
// =============================================================

#[test]
fn select_user_clears_unread_and_stale_transcript() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.roster[0].unread = 4;
    state.messages.push(message_from("u0", "old", "stale"));

    state.select_user("u1");

    assert_eq!(state.selected_user_id.as_deref(), Some("u1"));
    assert_eq!(state.roster[0].unread, 0);
    assert!(state.messages.is_empty());
    assert!(state.messages_loading);
}

#[test]
fn remove_selected_conversation_clears_selection() {
    let mut state = connected_with_roster(vec![
        entry("u1", "Alice", "alice@x.com"),
        entry("u2", "Bob", "bob@x.com"),
    ]);
    state.select_user("u1");
    state.messages_loading = false;
    state.apply_new_message(message_from("u1", "m1", "hello"));

    state.remove_conversation("u1");

    assert_eq!(state.roster.len(), 1);
    assert_eq!(state.roster[0].id, "u2");
    assert!(state.selected_user_id.is_none());
    assert!(state.messages.is_empty());
}

#[test]
fn remove_unselected_conversation_keeps_selection() {
    let mut state = connected_with_roster(vec![
        entry("u1", "Alice", "alice@x.com"),
        entry("u2", "Bob", "bob@x.com"),
    ]);
    state.select_user("u1");

    state.remove_conversation("u2");

    assert_eq!(state.selected_user_id.as_deref(), Some("u1"));
    assert_eq!(state.roster.len(), 1);
}

// =============================================================
// Send pipeline
// =============================================================

#[test]
fn begin_send_requires_a_selection() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    assert!(state.begin_send("hello".to_owned()).is_none());

    state.select_user("u1");
    let seq = state.begin_send("hello".to_owned());
    assert!(seq.is_some());
    assert_eq!(
        state.pending_send.as_ref().map(|p| p.recipient_id.as_str()),
        Some("u1")
    );
}

#[test]
fn accepted_ack_lands_reply_and_updates_preview() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.select_user("u1");
    state.messages_loading = false;
    state.draft = "On it".to_owned();
    let seq = state.begin_send("On it".to_owned()).unwrap();

    let ack = SendAck::Accepted {
        id: "m1".to_owned(),
        body: "On it".to_owned(),
        created_at: "2024-01-01T11:00:00Z".to_owned(),
    };
    state.resolve_send(seq, &ack, "admin-1");

    assert_eq!(state.messages.len(), 1);
    let sent = &state.messages[0];
    assert_eq!(sent.sender_role, SenderRole::Admin);
    assert!(sent.is_read);
    assert_eq!(sent.sender_id.as_deref(), Some("admin-1"));
    assert_eq!(sent.user_id.as_deref(), Some("u1"));

    assert_eq!(state.roster[0].last_message, "On it");
    assert_eq!(state.roster[0].last_message_at, "2024-01-01T11:00:00Z");
    assert!(state.draft.is_empty());
    assert!(state.pending_send.is_none());
}

#[test]
fn accepted_ack_after_selection_moved_skips_transcript() {
    let mut state = connected_with_roster(vec![
        entry("u1", "Alice", "alice@x.com"),
        entry("u2", "Bob", "bob@x.com"),
    ]);
    state.select_user("u1");
    state.messages_loading = false;
    let seq = state.begin_send("for alice".to_owned()).unwrap();

    state.select_user("u2");
    state.messages_loading = false;

    let ack = SendAck::Accepted {
        id: "m1".to_owned(),
        body: "for alice".to_owned(),
        created_at: "2024-01-01T11:00:00Z".to_owned(),
    };
    state.resolve_send(seq, &ack, "admin-1");

    // Bob's transcript stays clean; Alice's preview still reflects the send.
    assert!(state.messages.is_empty());
    let alice = state.roster.iter().find(|e| e.id == "u1").unwrap();
    assert_eq!(alice.last_message, "for alice");
}

#[test]
fn rejected_ack_reports_error_and_keeps_draft() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.select_user("u1");
    state.draft = "hello".to_owned();
    let seq = state.begin_send("hello".to_owned()).unwrap();

    state.resolve_send(seq, &SendAck::Rejected, "admin-1");

    assert_eq!(state.draft, "hello");
    assert_eq!(state.send_error.as_deref(), Some("Message was not delivered"));
    assert!(state.pending_send.is_none());
}

#[test]
fn fail_send_with_stale_seq_is_noop() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.select_user("u1");
    let seq = state.begin_send("hello".to_owned()).unwrap();

    state.fail_send(seq + 1, "nope");
    assert!(state.pending_send.is_some());

    state.fail_send(seq, "Message was not acknowledged");
    assert!(state.pending_send.is_none());
    assert_eq!(
        state.send_error.as_deref(),
        Some("Message was not acknowledged")
    );
}

// =============================================================
// filtered_roster / can_send
// =============================================================

#[test]
fn filter_matches_name_and_email_case_insensitive() {
    let mut state = connected_with_roster(vec![
        entry("u1", "Alice", "alice@x.com"),
        entry("u2", "Bob", "bob@other.org"),
    ]);

    state.search_query = "ALICE".to_owned();
    assert_eq!(state.filtered_roster().len(), 1);

    state.search_query = "other.org".to_owned();
    let hits = state.filtered_roster();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "u2");

    state.search_query = String::new();
    assert_eq!(state.filtered_roster().len(), 2);
}

#[test]
fn can_send_requires_connection_selection_and_draft() {
    let mut state = connected_with_roster(vec![entry("u1", "Alice", "alice@x.com")]);
    state.draft = "hello".to_owned();
    assert!(!state.can_send());

    state.select_user("u1");
    assert!(state.can_send());

    state.connection_status = ConnectionStatus::Disconnected;
    assert!(!state.can_send());

    state.connection_status = ConnectionStatus::Connected;
    state.begin_send("hello".to_owned());
    assert!(!state.can_send());
}
