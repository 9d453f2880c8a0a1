use super::*;

fn message(id: &str, role: SenderRole) -> ChatMessage {
    ChatMessage {
        id: id.to_owned(),
        body: "hello".to_owned(),
        created_at: "2024-01-01T10:00:00Z".to_owned(),
        is_read: false,
        sender_role: role,
        sender_id: None,
        recipient_id: None,
        user_id: None,
    }
}

fn connected() -> ChatState {
    ChatState {
        connection_status: ConnectionStatus::Connected,
        ..ChatState::default()
    }
}

// =============================================================
// Default state
// =============================================================

#[test]
fn default_state_is_connecting_and_empty() {
    let state = ChatState::default();
    assert_eq!(state.connection_status, ConnectionStatus::Connecting);
    assert!(state.loading);
    assert!(state.messages.is_empty());
    assert!(state.pending_send.is_none());
    assert!(!state.can_send());
}

// =============================================================
// seed / append
// =============================================================

#[test]
fn seed_replaces_transcript_and_clears_loading() {
    let mut state = ChatState {
        loading: true,
        error: Some("boom".to_owned()),
        ..ChatState::default()
    };
    state.append(message("stale", SenderRole::User));

    state.seed(vec![message("a", SenderRole::Admin), message("b", SenderRole::User)]);
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[0].id, "a");
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[test]
fn failed_history_fetch_surfaces_error_without_seeding() {
    let mut state = ChatState::default();
    assert!(state.loading);

    state.fail_load("request failed: 500");

    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("request failed: 500"));
    assert!(state.messages.is_empty());
}

#[test]
fn successful_seed_clears_an_earlier_load_error() {
    let mut state = ChatState::default();
    state.fail_load("request failed: 500");

    state.seed(vec![message("a", SenderRole::Admin)]);

    assert!(state.error.is_none());
    assert_eq!(state.messages.len(), 1);
}

#[test]
fn append_preserves_arrival_order() {
    let mut state = ChatState::default();
    state.append(message("first", SenderRole::Admin));
    state.append(message("second", SenderRole::User));
    assert_eq!(state.messages[0].id, "first");
    assert_eq!(state.messages[1].id, "second");
}

// =============================================================
// accepts_inbound
// =============================================================

#[test]
fn accepts_inbound_admin_authored() {
    let state = ChatState::default();
    assert!(state.accepts_inbound(&message("m", SenderRole::Admin), "u1"));
}

#[test]
fn accepts_inbound_own_conversation() {
    let state = ChatState::default();
    let msg = ChatMessage {
        user_id: Some("u1".to_owned()),
        ..message("m", SenderRole::User)
    };
    assert!(state.accepts_inbound(&msg, "u1"));
}

#[test]
fn rejects_inbound_for_other_user() {
    let state = ChatState::default();
    let msg = ChatMessage {
        user_id: Some("u2".to_owned()),
        ..message("m", SenderRole::User)
    };
    assert!(!state.accepts_inbound(&msg, "u1"));
}

// =============================================================
// Send pipeline
// =============================================================

#[test]
fn begin_send_records_pending_and_keeps_draft() {
    let mut state = connected();
    state.draft = "Hello".to_owned();

    let seq = state.begin_send("Hello".to_owned());
    assert_eq!(seq, 1);
    assert_eq!(
        state.pending_send,
        Some(PendingSend { seq: 1, body: "Hello".to_owned() })
    );
    assert_eq!(state.draft, "Hello");
    assert!(!state.can_send());
}

#[test]
fn begin_send_sequences_are_unique() {
    let mut state = connected();
    let a = state.begin_send("one".to_owned());
    state.pending_send = None;
    let b = state.begin_send("two".to_owned());
    assert_ne!(a, b);
}

#[test]
fn accepted_ack_appends_confirmed_message_and_clears_draft() {
    let mut state = connected();
    state.draft = "Hello".to_owned();
    let seq = state.begin_send("Hello".to_owned());

    let ack = SendAck::Accepted {
        id: "m1".to_owned(),
        body: "Hello".to_owned(),
        created_at: "2024-01-01T10:00:00Z".to_owned(),
    };
    state.resolve_send(seq, &ack, "u1");

    assert_eq!(state.messages.len(), 1);
    let sent = &state.messages[0];
    assert_eq!(sent.id, "m1");
    assert_eq!(sent.body, "Hello");
    assert_eq!(sent.sender_role, SenderRole::User);
    assert!(sent.is_read);
    assert_eq!(sent.sender_id.as_deref(), Some("u1"));
    assert_eq!(sent.user_id.as_deref(), Some("u1"));

    assert!(state.draft.is_empty());
    assert!(state.pending_send.is_none());
    assert!(state.send_error.is_none());
}

#[test]
fn rejected_ack_reports_error_and_keeps_draft() {
    let mut state = connected();
    state.draft = "Hello".to_owned();
    let seq = state.begin_send("Hello".to_owned());

    state.resolve_send(seq, &SendAck::Rejected, "u1");

    assert!(state.messages.is_empty());
    assert_eq!(state.draft, "Hello");
    assert_eq!(state.send_error.as_deref(), Some("Message was not delivered"));
    assert!(state.pending_send.is_none());
}

#[test]
fn stale_ack_seq_is_ignored() {
    let mut state = connected();
    let seq = state.begin_send("Hello".to_owned());

    let ack = SendAck::Accepted {
        id: "m1".to_owned(),
        body: "Hello".to_owned(),
        created_at: String::new(),
    };
    state.resolve_send(seq + 10, &ack, "u1");

    assert!(state.messages.is_empty());
    assert!(state.pending_send.is_some());
}

#[test]
fn fail_send_keeps_draft_and_reports_reason() {
    let mut state = connected();
    state.draft = "Hello".to_owned();
    let seq = state.begin_send("Hello".to_owned());

    state.fail_send(seq, "Message was not acknowledged");

    assert_eq!(state.draft, "Hello");
    assert!(state.pending_send.is_none());
    assert_eq!(
        state.send_error.as_deref(),
        Some("Message was not acknowledged")
    );
}

#[test]
fn late_ack_after_timeout_is_ignored() {
    let mut state = connected();
    let seq = state.begin_send("Hello".to_owned());
    state.fail_send(seq, "Message was not acknowledged");

    let ack = SendAck::Accepted {
        id: "m1".to_owned(),
        body: "Hello".to_owned(),
        created_at: String::new(),
    };
    state.resolve_send(seq, &ack, "u1");

    assert!(state.messages.is_empty());
}

#[test]
fn fail_send_with_stale_seq_is_noop() {
    let mut state = connected();
    let seq = state.begin_send("Hello".to_owned());
    state.fail_send(seq + 1, "nope");
    assert!(state.pending_send.is_some());
    assert!(state.send_error.is_none());
}

// =============================================================
// can_send
// =============================================================

#[test]
fn can_send_requires_connection() {
    let mut state = ChatState::default();
    state.draft = "Hello".to_owned();
    assert!(!state.can_send());
    state.connection_status = ConnectionStatus::Connected;
    assert!(state.can_send());
    state.connection_status = ConnectionStatus::Disconnected;
    assert!(!state.can_send());
}

#[test]
fn can_send_rejects_blank_draft() {
    let mut state = connected();
    state.draft = "   ".to_owned();
    assert!(!state.can_send());
}

#[test]
fn can_send_blocks_while_pending() {
    let mut state = connected();
    state.draft = "Hello".to_owned();
    state.begin_send("Hello".to_owned());
    state.draft = "Next".to_owned();
    assert!(!state.can_send());
}
