//! Connection status badge shown in the chat page headers.

use leptos::prelude::*;

use crate::state::chat::ConnectionStatus;

/// Small status badge: colored dot plus the connection state label.
#[component]
pub fn ConnectionBadge(status: Signal<ConnectionStatus>) -> impl IntoView {
    view! {
        <span class="connection-badge">
            <span class=move || dot_class(status.get())></span>
            <span class="connection-badge__label">{move || label(status.get())}</span>
        </span>
    }
}

fn dot_class(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "connection-badge__dot connection-badge__dot--connected",
        ConnectionStatus::Connecting => "connection-badge__dot connection-badge__dot--connecting",
        ConnectionStatus::Disconnected => "connection-badge__dot connection-badge__dot--disconnected",
    }
}

fn label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "CONNECTED",
        ConnectionStatus::Connecting => "CONNECTING",
        ConnectionStatus::Disconnected => "DISCONNECTED",
    }
}
