//! Investor-side support chat page.
//!
//! SYSTEM CONTEXT
//! ==============
//! This route owns the investor's single conversation with support: it seeds
//! the store from REST history on mount, opens the live socket, and tears
//! both down deterministically on unmount. The conversation store is a
//! page-local signal — no other view can reach it.

#[cfg(test)]
#[path = "support_chat_test.rs"]
mod support_chat_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::connection_badge::ConnectionBadge;
use crate::components::message_bubble::MessageBubble;
use crate::net::socket_client::SocketHandle;
use crate::net::types::SenderRole;
use crate::state::auth::AuthState;
use crate::state::chat::{ChatState, ConnectionStatus};
use crate::util::auth::install_unauth_redirect;

/// Investor chat page: status header, transcript, and ack-gated input.
#[component]
pub fn SupportChatPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    install_unauth_redirect(auth, navigate);

    // View-owned conversation store and socket; both die with this page.
    let chat = RwSignal::new(ChatState::default());
    let socket = RwSignal::new(None::<SocketHandle>);
    let history_requested = RwSignal::new(false);

    Effect::new(move || {
        let Some(user) = auth.get().user else {
            return;
        };
        #[cfg(feature = "hydrate")]
        {
            if socket.get_untracked().is_none() {
                let handle = crate::net::socket_client::spawn_user_socket(
                    &user.access_token,
                    &user.user_id,
                    chat,
                );
                socket.set(Some(handle));
            }
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = user;
    });

    Effect::new(move || {
        let Some(user) = auth.get().user else {
            return;
        };
        if history_requested.get() {
            return;
        }
        history_requested.set(true);
        #[cfg(feature = "hydrate")]
        {
            leptos::task::spawn_local(async move {
                match crate::net::api::fetch_messages(&user.access_token).await {
                    Ok(messages) => chat.update(|c| c.seed(messages)),
                    Err(e) => {
                        leptos::logging::warn!("history load failed: {e}");
                        chat.update(|c| c.fail_load(&e.to_string()));
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = user;
    });

    on_cleanup(move || {
        if let Some(handle) = socket.get_untracked() {
            handle.close();
        }
    });

    // Keep the transcript scrolled to the newest message.
    let messages_ref = NodeRef::<leptos::html::Div>::new();
    Effect::new(move || {
        let _ = chat.get().messages.len();
        #[cfg(feature = "hydrate")]
        {
            if let Some(el) = messages_ref.get() {
                let scroll_height = el.scroll_height();
                el.set_scroll_top(scroll_height);
            }
        }
    });

    let do_send = move || {
        let state = chat.get_untracked();
        if !state.can_send() {
            return;
        }
        let body = state.draft.trim().to_owned();
        let Some(user) = auth.get_untracked().user else {
            return;
        };
        let Some(handle) = socket.get_untracked() else {
            return;
        };

        let mut seq = 0;
        chat.update(|c| seq = c.begin_send(body.clone()));

        let event = crate::net::socket_client::user_send_message(seq, &body, &user.user_id);
        if !handle.send(&event) {
            chat.update(|c| c.fail_send(seq, "Message was not delivered"));
            return;
        }

        #[cfg(feature = "hydrate")]
        crate::net::socket_client::spawn_ack_timeout(
            seq,
            move |s| chat.get_untracked().pending_send.as_ref().map(|p| p.seq) == Some(s),
            move |s| chat.update(|c| c.fail_send(s, "Message was not acknowledged")),
        );
    };

    let on_send_click = move |_| do_send();
    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            do_send();
        }
    };

    let status = Signal::derive(move || chat.get().connection_status);
    let subtitle = move || status_subtitle(status.get());
    let presence = move || presence_label(status.get());
    let input_disabled = move || chat.get().connection_status != ConnectionStatus::Connected;
    let send_disabled = move || !chat.get().can_send();

    view! {
        <div class="chat-page">
            <header class="chat-page__header">
                <div>
                    <h1 class="chat-page__title">"Support Chat"</h1>
                    <p class="chat-page__subtitle">{subtitle}</p>
                </div>
                <ConnectionBadge status=status/>
            </header>

            <div class="chat-card">
                <div class="chat-card__peer">
                    <span class="chat-card__peer-name">"Support Team"</span>
                    <span class="chat-card__peer-presence">{presence}</span>
                </div>

                {move || {
                    let state = chat.get();
                    if state.loading {
                        return view! {
                            <div class="chat-card__notice">"Loading messages..."</div>
                        }
                            .into_any();
                    }
                    if let Some(error) = state.error {
                        return view! {
                            <div class="chat-card__notice chat-card__notice--error">{error}</div>
                        }
                            .into_any();
                    }
                    view! {
                        <div class="chat-card__messages" node_ref=messages_ref>
                            {state
                                .messages
                                .into_iter()
                                .map(|message| {
                                    view! {
                                        <MessageBubble message=message viewer_role=SenderRole::User/>
                                    }
                                })
                                .collect::<Vec<_>>()}
                        </div>
                    }
                        .into_any()
                }}

                <Show when=move || chat.get().send_error.is_some()>
                    <div class="chat-card__send-error">
                        {move || chat.get().send_error.unwrap_or_default()}
                    </div>
                </Show>

                <div class="chat-card__input-row">
                    <input
                        class="chat-card__input"
                        type="text"
                        placeholder="Type your message..."
                        prop:value=move || chat.get().draft
                        disabled=input_disabled
                        on:input=move |ev| {
                            chat.update(|c| c.draft = event_target_value(&ev));
                        }
                        on:keydown=on_keydown
                    />
                    <button
                        class="btn btn--primary chat-card__send"
                        disabled=send_disabled
                        on:click=on_send_click
                    >
                        "Send"
                    </button>
                </div>
            </div>
        </div>
    }
}

/// Header line under the page title, mirroring the connection state.
pub(crate) fn status_subtitle(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "Admin is online",
        ConnectionStatus::Connecting => "Connecting...",
        ConnectionStatus::Disconnected => "Disconnected",
    }
}

/// Presence label next to the support avatar.
pub(crate) fn presence_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "Online",
        ConnectionStatus::Connecting | ConnectionStatus::Disconnected => "Offline",
    }
}
