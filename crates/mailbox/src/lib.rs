//! Mailbox client: lists, sends and flags messages held by a [`MailStore`]
//! on behalf of an authenticated [`Session`].
//!
//! [`MailStore`]: db::services::store::MailStore

pub mod auth;
pub mod client;
pub mod error;
pub mod folder_key;
mod identity;

pub use auth::{Auth, Session};
pub use client::MailboxClient;
pub use error::MailboxError;
pub use folder_key::FolderKey;

/// Display address used when a sender cannot be resolved.
pub const UNKNOWN_SENDER: &str = "Unknown";
