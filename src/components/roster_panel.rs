//! Admin roster panel: searchable investor list with presence and previews.

#[cfg(test)]
#[path = "roster_panel_test.rs"]
mod roster_panel_test;

use leptos::prelude::*;

use crate::net::types::RosterEntry;
use crate::state::admin_chat::AdminChatState;
use crate::util::time::{now_utc_secs, relative_label};

/// Left-hand roster: search box plus one row per investor with online dot,
/// last-message preview, relative timestamp, and unread badge.
#[component]
pub fn RosterPanel(
    admin: RwSignal<AdminChatState>,
    on_select: Callback<String>,
) -> impl IntoView {
    view! {
        <div class="roster-panel">
            <div class="roster-panel__header">
                <h2 class="roster-panel__title">"Active Chats"</h2>
                <input
                    class="roster-panel__search"
                    type="text"
                    placeholder="Search users..."
                    prop:value=move || admin.get().search_query
                    on:input=move |ev| {
                        admin.update(|a| a.search_query = event_target_value(&ev));
                    }
                />
            </div>
            <div class="roster-panel__list">
                {move || {
                    let state = admin.get();
                    if state.roster_loading {
                        return view! {
                            <div class="roster-panel__empty">"Loading users..."</div>
                        }
                            .into_any();
                    }
                    let entries = state.filtered_roster();
                    if entries.is_empty() {
                        let label = if state.search_query.trim().is_empty() {
                            "No users available"
                        } else {
                            "No matching users"
                        };
                        return view! {
                            <div class="roster-panel__empty">{label}</div>
                        }
                            .into_any();
                    }
                    let selected = state.selected_user_id.clone();
                    entries
                        .into_iter()
                        .map(|entry| {
                            let id = entry.id.clone();
                            let is_selected = selected.as_deref() == Some(id.as_str());
                            view! {
                                <RosterRow entry=entry is_selected=is_selected on_select=on_select/>
                            }
                        })
                        .collect::<Vec<_>>()
                        .into_any()
                }}
            </div>
        </div>
    }
}

/// One roster row.
#[component]
fn RosterRow(entry: RosterEntry, is_selected: bool, on_select: Callback<String>) -> impl IntoView {
    let id = entry.id.clone();
    let when = relative_label(&entry.last_message_at, now_utc_secs());
    let preview = preview_label(&entry);
    let initial = initial_letter(&entry.name);
    let unread = entry.unread;
    let is_online = entry.is_online;
    let name = entry.name;
    let avatar = entry.avatar;

    view! {
        <div
            class=move || row_class(is_selected)
            on:click=move |_| on_select.run(id.clone())
        >
            <div class="roster-row__avatar-wrap">
                <img class="roster-row__avatar" src=avatar alt=initial/>
                <Show when=move || is_online>
                    <span class="roster-row__online-dot"></span>
                </Show>
            </div>
            <div class="roster-row__main">
                <div class="roster-row__top">
                    <span class="roster-row__name">{name}</span>
                    <span class="roster-row__time">{when}</span>
                </div>
                <div class="roster-row__bottom">
                    <span class="roster-row__preview">{preview}</span>
                    <Show when={move || unread > 0}>
                        <span class="roster-row__unread">{unread}</span>
                    </Show>
                </div>
            </div>
        </div>
    }
}

fn row_class(is_selected: bool) -> &'static str {
    if is_selected {
        "roster-row roster-row--selected"
    } else {
        "roster-row"
    }
}

/// Preview text, or a stand-in for conversations with no messages yet.
pub(crate) fn preview_label(entry: &RosterEntry) -> String {
    if entry.last_message.is_empty() {
        "No messages yet".to_owned()
    } else {
        entry.last_message.clone()
    }
}

/// Uppercased first letter of the display name, for avatar alt text.
pub(crate) fn initial_letter(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default()
}
