use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderType {
    Inbox,
    Sent,
    Draft,
    Trash,
    Custom,
}

impl FolderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderType::Inbox => "inbox",
            FolderType::Sent => "sent",
            FolderType::Draft => "draft",
            FolderType::Trash => "trash",
            FolderType::Custom => "custom",
        }
    }
}

impl fmt::Display for FolderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FolderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(FolderType::Inbox),
            "sent" => Ok(FolderType::Sent),
            "draft" => Ok(FolderType::Draft),
            "trash" => Ok(FolderType::Trash),
            "custom" => Ok(FolderType::Custom),
            other => Err(format!("unknown folder type '{}'", other)),
        }
    }
}

/// A named mailbox view owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub folder_type: FolderType,
    pub created_at: DateTime<Utc>,
}

// Raw row; `type` is TEXT in the database and checked on conversion.
#[derive(FromRow)]
pub struct FolderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    pub folder_type: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FolderRow> for Folder {
    type Error = String;

    fn try_from(row: FolderRow) -> Result<Self, Self::Error> {
        Ok(Folder {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            folder_type: row.folder_type.parse()?,
            created_at: row.created_at,
        })
    }
}
