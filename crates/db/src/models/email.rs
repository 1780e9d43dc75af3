use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One mail item as stored in the `emails` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub is_starred: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Resolved from the account directory at read time, never stored.
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender_email: Option<String>,
}

// Insert payload. Id, flags and timestamps are assigned by the store.
pub struct NewMessage<'a> {
    pub sender_id: Uuid,
    pub recipient_email: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

/// Partial update applied by `update_message`. `None` leaves the column alone;
/// `updated_at` is refreshed regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessagePatch {
    pub is_read: Option<bool>,
    pub is_starred: Option<bool>,
}

impl MessagePatch {
    pub fn read() -> Self {
        Self {
            is_read: Some(true),
            ..Self::default()
        }
    }

    pub fn starred(starred: bool) -> Self {
        Self {
            is_starred: Some(starred),
            ..Self::default()
        }
    }
}

/// Equality filter for message listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageFilter {
    RecipientEmail(String),
    SenderId(Uuid),
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        match self {
            MessageFilter::RecipientEmail(address) => message.recipient_email == *address,
            MessageFilter::SenderId(id) => message.sender_id == *id,
        }
    }
}
