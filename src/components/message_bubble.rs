//! One chat bubble: body, display-timezone timestamp, and `(You)` marker.

#[cfg(test)]
#[path = "message_bubble_test.rs"]
mod message_bubble_test;

use leptos::prelude::*;

use crate::net::types::{ChatMessage, SenderRole};
use crate::util::time::format_time;

/// A single message bubble, aligned by whether the viewer authored it.
#[component]
pub fn MessageBubble(message: ChatMessage, viewer_role: SenderRole) -> impl IntoView {
    let own = message.sender_role == viewer_role;
    let meta = meta_line(&message, viewer_role);
    view! {
        <div class=row_class(own)>
            <div class=bubble_class(own)>
                <p class="message-bubble__body">{message.body}</p>
                <div class="message-bubble__meta">{meta}</div>
            </div>
        </div>
    }
}

fn row_class(own: bool) -> &'static str {
    if own {
        "message-row message-row--own"
    } else {
        "message-row message-row--other"
    }
}

fn bubble_class(own: bool) -> &'static str {
    if own {
        "message-bubble message-bubble--own"
    } else {
        "message-bubble message-bubble--other"
    }
}

/// Timestamp line under the body; self-authored messages carry `(You)`.
pub(crate) fn meta_line(message: &ChatMessage, viewer_role: SenderRole) -> String {
    let time = format_time(&message.created_at);
    if message.sender_role == viewer_role {
        format!("{time} (You)")
    } else {
        time
    }
}
