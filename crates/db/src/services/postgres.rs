use crate::models::account::Account;
use crate::models::email::{Message, MessageFilter, MessagePatch, NewMessage};
use crate::models::folder::{Folder, FolderRow};
use crate::services::error::StoreError;
use crate::services::store::MailStore;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "id, sender_id, recipient_email, subject, body, is_read, is_starred, created_at, updated_at";

/// `MailStore` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgMailStore {
    pool: PgPool,
}

impl PgMailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Deletes sessions whose expiry has passed.
    pub async fn delete_expired_sessions(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MailStore for PgMailStore {
    async fn session_account(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.email
            FROM sessions s
            JOIN accounts a ON s.account_id = a.id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn accounts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let accounts =
            sqlx::query_as::<_, Account>("SELECT id, email FROM accounts WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        debug!(requested = ids.len(), found = accounts.len(), "resolved accounts");
        Ok(accounts)
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError> {
        let query = match filter {
            MessageFilter::RecipientEmail(address) => sqlx::query_as::<_, Message>(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM emails WHERE recipient_email = $1 ORDER BY created_at DESC"
            ))
            .bind(address.as_str())
            .fetch_all(&self.pool)
            .await,
            MessageFilter::SenderId(id) => sqlx::query_as::<_, Message>(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM emails WHERE sender_id = $1 ORDER BY created_at DESC"
            ))
            .bind(*id)
            .fetch_all(&self.pool)
            .await,
        };
        Ok(query?)
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, StoreError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM emails WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(message)
    }

    async fn insert_message(&self, message: &NewMessage<'_>) -> Result<Message, StoreError> {
        let record = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO emails (id, sender_id, recipient_email, subject, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(message.sender_id)
        .bind(message.recipient_email)
        .bind(message.subject)
        .bind(message.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_message(
        &self,
        id: Uuid,
        patch: &MessagePatch,
    ) -> Result<Option<Message>, StoreError> {
        let record = sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE emails
            SET is_read = COALESCE($2, is_read),
                is_starred = COALESCE($3, is_starred),
                updated_at = GREATEST(NOW(), updated_at)
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.is_read)
        .bind(patch.is_starred)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_folders(&self, owner_id: Uuid) -> Result<Vec<Folder>, StoreError> {
        let rows = sqlx::query_as::<_, FolderRow>(
            r#"
            SELECT id, user_id, name, type, created_at
            FROM folders
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Folder::try_from(row).map_err(StoreError::Corrupt))
            .collect()
    }
}
