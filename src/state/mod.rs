//! Application state modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each chat page exclusively owns its conversation store (`chat` or
//! `admin_chat`) as a page-local signal; only `auth` is shared app-wide via
//! context. Stores are plain structs mutated through methods so every
//! transition is natively testable.

pub mod admin_chat;
pub mod auth;
pub mod chat;
