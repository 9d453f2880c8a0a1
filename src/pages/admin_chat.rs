//! Admin support console: investor roster plus the selected conversation.
//!
//! SYSTEM CONTEXT
//! ==============
//! This route is the support side of the chat. The roster is kept current by
//! two sources: the live event stream and a 30 s REST poll that backstops
//! missed events. Selecting an investor loads that conversation's history;
//! everything is torn down with the view.

#[cfg(test)]
#[path = "admin_chat_test.rs"]
mod admin_chat_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::connection_badge::ConnectionBadge;
use crate::components::message_bubble::MessageBubble;
use crate::components::roster_panel::RosterPanel;
use crate::net::socket_client::SocketHandle;
use crate::net::types::SenderRole;
use crate::state::admin_chat::AdminChatState;
use crate::state::auth::AuthState;
use crate::state::chat::ConnectionStatus;
use crate::util::auth::install_unauth_redirect;

/// Roster poll cadence.
pub const ROSTER_POLL_SECS: u64 = 30;

/// Admin chat page. Non-admin sessions see an unauthorized notice instead of
/// the console.
#[component]
pub fn AdminChatPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    install_unauth_redirect(auth, navigate);

    view! {
        <Show
            when=move || auth.get().loading || auth.get().is_admin()
            fallback=|| {
                view! {
                    <div class="admin-chat-page">
                        <p class="admin-chat-page__unauthorized">
                            "You are not authorized to view this page."
                        </p>
                    </div>
                }
            }
        >
            <AdminChatConsole/>
        </Show>
    }
}

#[component]
fn AdminChatConsole() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    let admin = RwSignal::new(AdminChatState::default());
    let socket = RwSignal::new(None::<SocketHandle>);

    Effect::new(move || {
        if !auth.get().is_admin() {
            return;
        }
        let Some(user) = auth.get().user else {
            return;
        };
        #[cfg(feature = "hydrate")]
        {
            if socket.get_untracked().is_none() {
                let handle = crate::net::socket_client::spawn_admin_socket(
                    &user.access_token,
                    &user.user_id,
                    admin,
                );
                socket.set(Some(handle));
            }
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = user;
    });

    on_cleanup(move || {
        if let Some(handle) = socket.get_untracked() {
            handle.close();
        }
    });

    // Initial roster fetch once the session is known.
    let roster_requested = RwSignal::new(false);
    Effect::new(move || {
        let Some(user) = auth.get().user else {
            return;
        };
        if roster_requested.get() {
            return;
        }
        roster_requested.set(true);
        fetch_roster_into(&user.access_token, admin);
    });

    // Poll backstop: live events win any disagreement with polled data.
    #[cfg(feature = "hydrate")]
    {
        let poll_alive = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
        let poll_alive_task = poll_alive.clone();
        leptos::task::spawn_local(async move {
            loop {
                gloo_timers::future::sleep(std::time::Duration::from_secs(ROSTER_POLL_SECS)).await;
                if !poll_alive_task.load(std::sync::atomic::Ordering::Relaxed) {
                    break;
                }
                let Some(user) = auth.get_untracked().user else {
                    continue;
                };
                fetch_roster_into(&user.access_token, admin);
            }
        });
        on_cleanup(move || poll_alive.store(false, std::sync::atomic::Ordering::Relaxed));
    }

    // Load the selected conversation's history whenever the selection moves.
    let last_history_user = RwSignal::new(None::<String>);
    Effect::new(move || {
        let Some(selected) = admin.get().selected_user_id else {
            return;
        };
        if last_history_user.get_untracked().as_deref() == Some(selected.as_str()) {
            return;
        }
        last_history_user.set(Some(selected.clone()));
        let Some(user) = auth.get_untracked().user else {
            return;
        };
        #[cfg(feature = "hydrate")]
        {
            leptos::task::spawn_local(async move {
                match crate::net::api::fetch_conversation(&user.access_token, &selected).await {
                    Ok(messages) => admin.update(|a| {
                        // Selection may have moved again while the fetch ran.
                        if a.selected_user_id.as_deref() == Some(selected.as_str()) {
                            a.seed_messages(messages);
                        }
                    }),
                    Err(e) => {
                        leptos::logging::warn!("conversation load failed: {e}");
                        admin.update(|a| a.fail_messages_load(&e.to_string()));
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (user, selected);
    });

    let on_select = Callback::new(move |user_id: String| {
        admin.update(|a| a.select_user(&user_id));
    });

    let delete_user_id = RwSignal::new(None::<String>);
    let on_delete_request = move |_| {
        if let Some(id) = admin.get_untracked().selected_user_id {
            delete_user_id.set(Some(id));
        }
    };
    let on_delete_cancel = Callback::new(move |_| delete_user_id.set(None));

    // Autoscroll the transcript as messages arrive.
    let messages_ref = NodeRef::<leptos::html::Div>::new();
    Effect::new(move || {
        let _ = admin.get().messages.len();
        #[cfg(feature = "hydrate")]
        {
            if let Some(el) = messages_ref.get() {
                let scroll_height = el.scroll_height();
                el.set_scroll_top(scroll_height);
            }
        }
    });

    let do_send = move || {
        let state = admin.get_untracked();
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

        let Some(recipient) = state.selected_user_id else {
            return;
        };

        let mut seq = None;
        admin.update(|a| seq = a.begin_send(body.clone()));
        let Some(seq) = seq else {
            return;
        };

        let event =
            crate::net::socket_client::admin_send_message(seq, &body, &recipient, &user.user_id);
        if !handle.send(&event) {
            admin.update(|a| a.fail_send(seq, "Message was not delivered"));
            return;
        }

        #[cfg(feature = "hydrate")]
        crate::net::socket_client::spawn_ack_timeout(
            seq,
            move |s| admin.get_untracked().pending_send.as_ref().map(|p| p.seq) == Some(s),
            move |s| admin.update(|a| a.fail_send(s, "Message was not acknowledged")),
        );
    };

    let on_send_click = move |_| do_send();
    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            do_send();
        }
    };

    let status = Signal::derive(move || admin.get().connection_status);
    let input_disabled = move || reply_input_disabled(&admin.get());
    let send_disabled = move || !admin.get().can_send();

    view! {
        <div class="admin-chat-page">
            <header class="admin-chat-page__header">
                <h1 class="admin-chat-page__title">"Support Console"</h1>
                <ConnectionBadge status=status/>
            </header>

            <Show when=move || admin.get().error.is_some()>
                <p class="admin-chat-page__error">{move || admin.get().error.unwrap_or_default()}</p>
            </Show>

            <div class="admin-chat-page__body">
                <RosterPanel admin=admin on_select=on_select/>

                <div class="admin-chat-page__conversation">
                    {move || {
                        let state = admin.get();
                        let Some(peer) = state.selected_user().cloned() else {
                            return view! {
                                <div class="admin-chat-page__placeholder">
                                    "Select a conversation to start chatting"
                                </div>
                            }
                                .into_any();
                        };
                        view! {
                            <div class="conversation">
                                <div class="conversation__header">
                                    <div class="conversation__peer">
                                        <span class="conversation__peer-name">{peer.name.clone()}</span>
                                        <span class="conversation__peer-presence">
                                            {peer_presence(peer.is_online)}
                                        </span>
                                    </div>
                                    <button
                                        class="btn btn--danger conversation__delete"
                                        on:click=on_delete_request
                                    >
                                        "Delete Chat"
                                    </button>
                                </div>

                                {if state.messages_loading {
                                    view! {
                                        <div class="conversation__notice">"Loading conversation..."</div>
                                    }
                                        .into_any()
                                } else {
                                    view! {
                                        <div class="conversation__messages" node_ref=messages_ref>
                                            {state
                                                .messages
                                                .into_iter()
                                                .map(|message| {
                                                    view! {
                                                        <MessageBubble
                                                            message=message
                                                            viewer_role=SenderRole::Admin
                                                        />
                                                    }
                                                })
                                                .collect::<Vec<_>>()}
                                        </div>
                                    }
                                        .into_any()
                                }}

                                <Show when=move || admin.get().send_error.is_some()>
                                    <div class="conversation__send-error">
                                        {move || admin.get().send_error.unwrap_or_default()}
                                    </div>
                                </Show>

                                <div class="conversation__input-row">
                                    <input
                                        class="conversation__input"
                                        type="text"
                                        placeholder="Type a reply..."
                                        prop:value=move || admin.get().draft
                                        disabled=input_disabled
                                        on:input=move |ev| {
                                            admin.update(|a| a.draft = event_target_value(&ev));
                                        }
                                        on:keydown=on_keydown
                                    />
                                    <button
                                        class="btn btn--primary conversation__send"
                                        disabled=send_disabled
                                        on:click=on_send_click
                                    >
                                        "Send"
                                    </button>
                                </div>
                            </div>
                        }
                            .into_any()
                    }}
                </div>
            </div>

            <Show when=move || delete_user_id.get().is_some()>
                <DeleteChatDialog user_id=delete_user_id on_cancel=on_delete_cancel admin=admin/>
            </Show>
        </div>
    }
}

/// Modal dialog confirming a conversation delete.
#[component]
fn DeleteChatDialog(
    user_id: RwSignal<Option<String>>,
    on_cancel: Callback<()>,
    admin: RwSignal<AdminChatState>,
) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();

    let submit = Callback::new(move |_| {
        let Some(id) = user_id.get_untracked() else {
            return;
        };
        let Some(user) = auth.get_untracked().user else {
            return;
        };
        #[cfg(feature = "hydrate")]
        {
            leptos::task::spawn_local(async move {
                match crate::net::api::delete_conversation(&user.access_token, &id).await {
                    Ok(()) => admin.update(|a| a.remove_conversation(&id)),
                    Err(e) => {
                        leptos::logging::warn!("delete conversation failed: {e}");
                        admin.update(|a| a.send_error = Some(e.to_string()));
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = (user, id);
        on_cancel.run(());
    });

    view! {
        <div class="dialog-backdrop" on:click=move |_| on_cancel.run(())>
            <div class="dialog" on:click=move |ev| ev.stop_propagation()>
                <h2>"Delete Chat"</h2>
                <p class="dialog__danger">
                    "This will permanently delete this conversation and its messages."
                </p>
                <div class="dialog__actions">
                    <button class="btn" on:click=move |_| on_cancel.run(())>
                        "Cancel"
                    </button>
                    <button class="btn btn--danger" on:click=move |_| submit.run(())>
                        "Delete"
                    </button>
                </div>
            </div>
        </div>
    }
}

/// Gate for the reply input: needs a live socket and a selected
/// conversation to type into.
pub(crate) fn reply_input_disabled(state: &AdminChatState) -> bool {
    state.connection_status != ConnectionStatus::Connected || state.selected_user_id.is_none()
}

/// Presence label in the conversation header.
pub(crate) fn peer_presence(is_online: bool) -> &'static str {
    if is_online { "Online" } else { "Offline" }
}

fn fetch_roster_into(token: &str, admin: RwSignal<AdminChatState>) {
    #[cfg(not(feature = "hydrate"))]
    let _ = (token, admin);
    #[cfg(feature = "hydrate")]
    {
        let token = token.to_owned();
        leptos::task::spawn_local(async move {
            match crate::net::api::fetch_roster(&token).await {
                Ok(entries) => admin.update(|a| a.merge_roster_fetch(entries)),
                Err(e) => {
                    leptos::logging::warn!("roster fetch failed: {e}");
                    admin.update(|a| a.fail_roster_load(&e.to_string()));
                }
            }
        });
    }
}
