//! REST history loader for chat messages and the admin roster.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net` with the session's
//! bearer credential attached to every request.
//! Server-side (SSR): stubs returning errors/`None` since these endpoints
//! are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! A non-2xx response becomes [`FetchError::Status`]; it is rendered as an
//! inline error panel and never retried automatically — re-mounting the view
//! or re-selecting the conversation is the retry path.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use crate::net::types::{ChatMessage, RosterEntry, SessionUser};

/// A failed REST read or delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered outside the 2xx range.
    Status(u16),
    /// Request never completed (network failure, SSR stub).
    Network(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "request failed: {code}"),
            Self::Network(reason) => write!(f, "request failed: {reason}"),
        }
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn conversation_endpoint(user_id: &str) -> String {
    format!("/api/chat/admin/conversations/{user_id}")
}

/// Fetch the current session from `/api/auth/session`.
/// Returns `None` if not authenticated or on the server.
pub async fn fetch_session() -> Option<SessionUser> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::get("/api/auth/session")
            .send()
            .await
            .ok()?;
        if !resp.ok() {
            return None;
        }
        resp.json::<SessionUser>().await.ok()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// Fetch the investor's own conversation history.
///
/// # Errors
///
/// Returns [`FetchError`] on a non-2xx status or transport failure.
pub async fn fetch_messages(token: &str) -> Result<Vec<ChatMessage>, FetchError> {
    let data = get_json(token, "/api/chat/messages").await?;
    Ok(super::socket_parse::messages_from_response(&data))
}

/// Fetch the full investor roster (admin only).
///
/// # Errors
///
/// Returns [`FetchError`] on a non-2xx status or transport failure.
pub async fn fetch_roster(token: &str) -> Result<Vec<RosterEntry>, FetchError> {
    let data = get_json(token, "/api/chat/admin/users").await?;
    let rows = data.as_array().cloned().unwrap_or_default();
    Ok(rows
        .iter()
        .filter_map(super::socket_parse::normalize_roster_entry)
        .collect())
}

/// Fetch one investor's conversation history (admin only).
///
/// # Errors
///
/// Returns [`FetchError`] on a non-2xx status or transport failure.
pub async fn fetch_conversation(token: &str, user_id: &str) -> Result<Vec<ChatMessage>, FetchError> {
    #[cfg(feature = "hydrate")]
    {
        let data = get_json(token, &conversation_endpoint(user_id)).await?;
        Ok(super::socket_parse::messages_from_response(&data))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (token, user_id);
        Err(ssr_stub())
    }
}

/// Delete one investor's conversation history (admin only).
///
/// # Errors
///
/// Returns [`FetchError`] on a non-2xx status or transport failure.
pub async fn delete_conversation(token: &str, user_id: &str) -> Result<(), FetchError> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::delete(&conversation_endpoint(user_id))
            .header("Authorization", &bearer(token))
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if !resp.ok() {
            return Err(FetchError::Status(resp.status()));
        }
        Ok(())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (token, user_id);
        Err(ssr_stub())
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(feature = "hydrate")]
async fn get_json(token: &str, path: &str) -> Result<serde_json::Value, FetchError> {
    let resp = gloo_net::http::Request::get(path)
        .header("Authorization", &bearer(token))
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }
    resp.json::<serde_json::Value>()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))
}

#[cfg(not(feature = "hydrate"))]
async fn get_json(token: &str, path: &str) -> Result<serde_json::Value, FetchError> {
    let _ = (token, path);
    Err(ssr_stub())
}

#[cfg(not(feature = "hydrate"))]
fn ssr_stub() -> FetchError {
    FetchError::Network("not available on server".to_owned())
}
