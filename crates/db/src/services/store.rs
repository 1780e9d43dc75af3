use crate::models::account::Account;
use crate::models::email::{Message, MessageFilter, MessagePatch, NewMessage};
use crate::models::folder::Folder;
use crate::services::error::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

/// Query interface of the backend that holds messages, folders and the
/// account directory.
#[async_trait]
pub trait MailStore: Send + Sync {
    /// Account owning a live session token. Expired and unknown tokens yield `None`.
    async fn session_account(&self, token: &str) -> Result<Option<Account>, StoreError>;

    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;

    /// Batched directory lookup. Ids without an account are absent from the result.
    async fn accounts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, StoreError>;

    /// Messages matching `filter`, newest first.
    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError>;

    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, StoreError>;

    async fn insert_message(&self, message: &NewMessage<'_>) -> Result<Message, StoreError>;

    /// Applies `patch` and refreshes `updated_at`. Returns the stored row
    /// after the update, or `None` when no message has this id.
    async fn update_message(
        &self,
        id: Uuid,
        patch: &MessagePatch,
    ) -> Result<Option<Message>, StoreError>;

    /// Folders owned by `owner_id`, oldest first.
    async fn list_folders(&self, owner_id: Uuid) -> Result<Vec<Folder>, StoreError>;
}
