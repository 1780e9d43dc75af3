use db::models::folder::FolderType;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Selects which view of the mailbox to list.
///
/// Only `Inbox` and `Sent` have a defined membership rule; the others name
/// stored folders that messages carry no reference to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FolderKey {
    #[default]
    Inbox,
    Sent,
    Draft,
    Trash,
    Custom(String),
}

impl FolderKey {
    pub fn as_str(&self) -> &str {
        match self {
            FolderKey::Inbox => "inbox",
            FolderKey::Sent => "sent",
            FolderKey::Draft => "draft",
            FolderKey::Trash => "trash",
            FolderKey::Custom(name) => name,
        }
    }
}

impl From<&str> for FolderKey {
    fn from(s: &str) -> Self {
        match s {
            "" | "inbox" => FolderKey::Inbox,
            "sent" => FolderKey::Sent,
            "draft" => FolderKey::Draft,
            "trash" => FolderKey::Trash,
            other => FolderKey::Custom(other.to_string()),
        }
    }
}

impl FromStr for FolderKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FolderKey::from(s))
    }
}

impl From<FolderType> for FolderKey {
    fn from(folder_type: FolderType) -> Self {
        match folder_type {
            FolderType::Inbox => FolderKey::Inbox,
            FolderType::Sent => FolderKey::Sent,
            FolderType::Draft => FolderKey::Draft,
            FolderType::Trash => FolderKey::Trash,
            FolderType::Custom => FolderKey::Custom(FolderType::Custom.to_string()),
        }
    }
}

impl fmt::Display for FolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
