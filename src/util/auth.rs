//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both chat routes apply identical unauthenticated redirect behavior; the
//! login screen itself lives outside this client.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

/// Where to send the browser for a session that cannot view chat, or
/// `None` to stay put. Nothing moves while the session fetch is still in
/// flight.
#[must_use]
pub fn redirect_for(auth: &AuthState) -> Option<&'static str> {
    if auth.loading || auth.user.is_some() {
        None
    } else {
        Some("/login")
    }
}

/// Redirect whenever the session has loaded and no user is present.
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if let Some(target) = redirect_for(&auth.get()) {
            navigate(target, NavigateOptions::default());
        }
    });
}
