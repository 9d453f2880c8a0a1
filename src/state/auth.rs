//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session issuance lives outside this client; the chat core only needs the
//! bearer credential and identity that `/api/auth/session` hands back. Route
//! guards and both chat pages read this from context.

use crate::net::types::{SenderRole, SessionUser};

/// Authentication state tracking the current session and loading status.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub loading: bool,
}

impl AuthState {
    /// Whether the current session may mount the admin chat view.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == SenderRole::Admin)
    }
}
