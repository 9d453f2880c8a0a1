//! WebSocket client for the real-time chat channel.
//!
//! The socket is a *view-scoped* resource: each chat page creates a
//! [`SocketHandle`] on mount via `spawn_user_socket` / `spawn_admin_socket`
//! and closes it in `on_cleanup`, so no connection outlives its view and
//! test instances never share a process-wide singleton.
//!
//! All WebSocket logic is gated behind `#[cfg(feature = "hydrate")]` since it
//! requires a browser environment.
//!
//! ERROR HANDLING
//! ==============
//! Connect and transport failures never surface as errors to callers; they
//! become `ConnectionStatus` transitions: `Connecting` before the first
//! connect, then `Disconnected` through every retry until one succeeds.
//! After a drop the loop retries a bounded number of times with a fixed
//! delay, re-asserting room membership on every successful reconnect, then
//! settles in `Disconnected`. Each healthy session restores the full retry
//! budget for the next drop.

#[cfg(test)]
#[path = "socket_client_test.rs"]
mod socket_client_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::net::types::ChatEvent;
#[cfg(feature = "hydrate")]
use crate::state::admin_chat::AdminChatState;
#[cfg(feature = "hydrate")]
use crate::state::chat::ChatState;
#[cfg(feature = "hydrate")]
use crate::state::chat::ConnectionStatus;

/// Reconnect attempts made after a failure before giving up.
pub const RECONNECT_ATTEMPTS: u32 = 5;

/// Fixed delay between reconnect attempts, in milliseconds.
pub const RECONNECT_DELAY_MS: u32 = 1000;

/// How long a `send_message` emission waits for its ack before it is
/// reported as failed.
pub const SEND_ACK_TIMEOUT_MS: u64 = 8000;

/// Minimum session length for a connection to count as healthy.
pub const HEALTHY_SESSION_MIN_MS: u32 = 5000;

/// Reconnect policy: delay before the next attempt, or `None` once the
/// retry budget of [`RECONNECT_ATTEMPTS`] is spent.
#[must_use]
pub fn reconnect_delay_ms(reconnects_used: u32) -> Option<u32> {
    (reconnects_used < RECONNECT_ATTEMPTS).then_some(RECONNECT_DELAY_MS)
}

/// Whether a finished session restores the full retry budget. The budget is
/// per-disconnect, so any healthy session resets it; the duration floor
/// keeps a connect-reject loop (e.g. an expired token whose handshake
/// closes immediately) from retrying forever.
#[must_use]
pub fn session_refreshes_budget(session_ms: f64) -> bool {
    session_ms >= f64::from(HEALTHY_SESSION_MIN_MS)
}

/// Join events the investor view emits on every successful (re)connect.
/// Room membership is not preserved by the transport across reconnects, so
/// the same sequence is re-emitted each time.
#[must_use]
pub fn join_events_for_user(user_id: &str) -> Vec<ChatEvent> {
    vec![ChatEvent::new(
        "join_user_room",
        serde_json::json!({ "user_id": user_id }),
    )]
}

/// Join events the admin view emits on every successful (re)connect: the
/// shared admin room plus the admin's own identity room.
#[must_use]
pub fn join_events_for_admin(admin_id: &str) -> Vec<ChatEvent> {
    vec![
        ChatEvent::new("join_admin_room", serde_json::json!({})),
        ChatEvent::new("join_admin", serde_json::json!(admin_id)),
    ]
}

/// Outbound `send_message` for the investor view; the target is implicitly
/// the support channel.
#[must_use]
pub fn user_send_message(seq: u64, body: &str, user_id: &str) -> ChatEvent {
    ChatEvent {
        event: "send_message".to_owned(),
        seq: Some(seq),
        data: serde_json::json!({
            "message": body,
            "user_id": user_id,
        }),
    }
}

/// Outbound `send_message` for the admin view, addressed to one investor.
#[must_use]
pub fn admin_send_message(seq: u64, body: &str, recipient_id: &str, sender_id: &str) -> ChatEvent {
    ChatEvent {
        event: "send_message".to_owned(),
        seq: Some(seq),
        data: serde_json::json!({
            "message": body,
            "recipient_id": recipient_id,
            "sender_role": "admin",
            "sender_id": sender_id,
            "user_id": recipient_id,
        }),
    }
}

/// Connect URL carrying the bearer credential; authentication happens at
/// connect time, not per message.
#[must_use]
pub fn chat_ws_url(secure: bool, host: &str, token: &str) -> String {
    let proto = if secure { "wss" } else { "ws" };
    format!("{proto}://{host}/api/chat/ws?token={token}")
}

/// Handle to a live chat socket, owned by the view that spawned it.
///
/// Cloneable so event handlers can share it; `close` is idempotent and
/// tears down the outbound channel, which unwinds the connection loop.
#[derive(Clone)]
pub struct SocketHandle {
    #[cfg(feature = "hydrate")]
    tx: futures::channel::mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

impl SocketHandle {
    /// Serialize an event onto the outbound channel.
    ///
    /// Returns `false` when the handle is closed or no connection loop is
    /// running (SSR), in which case the event is dropped.
    pub fn send(&self, event: &ChatEvent) -> bool {
        if self.closed.load(Ordering::Relaxed) {
            return false;
        }
        #[cfg(feature = "hydrate")]
        {
            match serde_json::to_string(event) {
                Ok(text) => self.tx.unbounded_send(text).is_ok(),
                Err(_) => false,
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = event;
            false
        }
    }

    /// Scoped teardown: stops the connection loop and detaches it from the
    /// owning view. Safe to call in any connection state.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
        #[cfg(feature = "hydrate")]
        self.tx.close_channel();
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

/// Spawn the investor-side socket lifecycle as a local async task.
#[cfg(feature = "hydrate")]
pub fn spawn_user_socket(
    token: &str,
    user_id: &str,
    chat: leptos::prelude::RwSignal<ChatState>,
) -> SocketHandle {
    use leptos::prelude::Update;

    let self_id = user_id.to_owned();
    spawn_socket(
        token,
        join_events_for_user(user_id),
        move |status| chat.update(|c| c.connection_status = status),
        move |event| {
            chat.update(|c| {
                super::socket_events::apply_user_event(event, &self_id, c);
            });
        },
    )
}

/// Spawn the admin-side socket lifecycle as a local async task.
#[cfg(feature = "hydrate")]
pub fn spawn_admin_socket(
    token: &str,
    admin_id: &str,
    admin: leptos::prelude::RwSignal<AdminChatState>,
) -> SocketHandle {
    use leptos::prelude::Update;

    let self_id = admin_id.to_owned();
    spawn_socket(
        token,
        join_events_for_admin(admin_id),
        move |status| admin.update(|a| a.connection_status = status),
        move |event| {
            admin.update(|a| {
                super::socket_events::apply_admin_event(event, &self_id, a);
            });
        },
    )
}

/// Report a pending send as failed when its ack has not arrived within
/// [`SEND_ACK_TIMEOUT_MS`].
#[cfg(feature = "hydrate")]
pub fn spawn_ack_timeout(
    seq: u64,
    is_pending: impl Fn(u64) -> bool + 'static,
    on_timeout: impl Fn(u64) + 'static,
) {
    leptos::task::spawn_local(async move {
        gloo_timers::future::sleep(std::time::Duration::from_millis(SEND_ACK_TIMEOUT_MS)).await;
        if is_pending(seq) {
            on_timeout(seq);
        }
    });
}

#[cfg(feature = "hydrate")]
fn spawn_socket(
    token: &str,
    joins: Vec<ChatEvent>,
    set_status: impl Fn(ConnectionStatus) + 'static,
    on_event: impl Fn(&ChatEvent) + 'static,
) -> SocketHandle {
    use futures::channel::mpsc;

    let (tx, rx) = mpsc::unbounded::<String>();
    let handle = SocketHandle {
        tx,
        closed: Arc::new(AtomicBool::new(false)),
    };

    let location = web_sys::window().map(|w| w.location());
    let secure = location
        .as_ref()
        .and_then(|l| l.protocol().ok())
        .is_some_and(|p| p == "https:");
    let host = location
        .and_then(|l| l.host().ok())
        .unwrap_or_else(|| "localhost:3000".to_owned());
    let url = chat_ws_url(secure, &host, token);

    let closed = handle.closed.clone();
    leptos::task::spawn_local(socket_loop(url, joins, closed, rx, set_status, on_event));

    handle
}

/// Main connection loop with bounded, fixed-delay reconnect.
#[cfg(feature = "hydrate")]
async fn socket_loop(
    url: String,
    joins: Vec<ChatEvent>,
    closed: Arc<AtomicBool>,
    rx: futures::channel::mpsc::UnboundedReceiver<String>,
    set_status: impl Fn(ConnectionStatus) + 'static,
    on_event: impl Fn(&ChatEvent) + 'static,
) {
    use std::cell::RefCell;
    use std::rc::Rc;

    let rx = Rc::new(RefCell::new(rx));
    let mut reconnects: u32 = 0;

    // Retries stay `Disconnected` until one succeeds; `Connecting` is only
    // shown ahead of the first connect.
    set_status(ConnectionStatus::Connecting);

    loop {
        if closed.load(Ordering::Relaxed) {
            break;
        }

        let started = js_sys::Date::now();
        match connect_and_run(&url, &joins, &rx, &set_status, &on_event).await {
            Ok(()) => {
                leptos::logging::log!("chat socket disconnected");
                if session_refreshes_budget(js_sys::Date::now() - started) {
                    reconnects = 0;
                }
            }
            Err(e) => {
                leptos::logging::warn!("chat socket error: {e}");
            }
        }

        set_status(ConnectionStatus::Disconnected);
        if closed.load(Ordering::Relaxed) {
            break;
        }

        let Some(delay_ms) = reconnect_delay_ms(reconnects) else {
            leptos::logging::warn!("chat socket retry budget exhausted; staying disconnected");
            break;
        };
        reconnects += 1;
        gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(delay_ms))).await;
    }
}

/// Connect, re-assert room membership, then pump messages until disconnect.
#[cfg(feature = "hydrate")]
async fn connect_and_run(
    url: &str,
    joins: &[ChatEvent],
    rx: &std::rc::Rc<std::cell::RefCell<futures::channel::mpsc::UnboundedReceiver<String>>>,
    set_status: &impl Fn(ConnectionStatus),
    on_event: &impl Fn(&ChatEvent),
) -> Result<(), String> {
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    let ws = WebSocket::open(url).map_err(|e| e.to_string())?;
    let (mut ws_write, mut ws_read) = ws.split();

    // Rooms must be re-joined on every successful (re)connect; the server
    // does not preserve membership across transport sessions.
    for join in joins {
        let text = serde_json::to_string(join).map_err(|e| e.to_string())?;
        ws_write.send(Message::Text(text)).await.map_err(|e| e.to_string())?;
    }

    set_status(ConnectionStatus::Connected);

    let mut rx_borrow = rx.borrow_mut();
    let send_task = async {
        while let Some(text) = rx_borrow.next().await {
            if ws_write.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ChatEvent>(&text) {
                        Ok(event) => on_event(&event),
                        Err(e) => {
                            leptos::logging::warn!("unparseable chat event: {e}");
                        }
                    }
                }
                Ok(Message::Bytes(_)) => {}
                Err(e) => {
                    leptos::logging::warn!("chat socket recv error: {e}");
                    break;
                }
            }
        }
    };

    // When either side finishes, the connection is done.
    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;

    Ok(())
}
