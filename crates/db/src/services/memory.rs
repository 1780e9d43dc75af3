//! In-process `MailStore` for tests and local runs.
//!
//! Mirrors the PostgreSQL store's observable behavior: timestamps are
//! assigned on insert, `updated_at` never moves backwards, listings are
//! newest first and folders oldest first.

use crate::models::account::Account;
use crate::models::email::{Message, MessageFilter, MessagePatch, NewMessage};
use crate::models::folder::{Folder, FolderType};
use crate::services::error::StoreError;
use crate::services::generator::generate_session_token;
use crate::services::store::MailStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredSession {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    sessions: HashMap<String, StoredSession>,
    messages: Vec<Message>,
    folders: Vec<Folder>,
    // Last timestamp handed out; keeps creation order strict within this store.
    clock: Option<DateTime<Utc>>,
}

impl Inner {
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }
}

#[derive(Default)]
pub struct MemoryMailStore {
    inner: RwLock<Inner>,
    account_lookups: AtomicUsize,
    offline: AtomicBool,
    directory_offline: AtomicBool,
}

impl MemoryMailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_account(&self, email: &str) -> Account {
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.inner
            .write()
            .await
            .accounts
            .insert(account.id, account.clone());
        account
    }

    /// Opens a session for `account_id` valid for `ttl` and returns its token.
    pub async fn open_session(&self, account_id: Uuid, ttl: Duration) -> String {
        let token = generate_session_token();
        self.inner.write().await.sessions.insert(
            token.clone(),
            StoredSession {
                account_id,
                expires_at: Utc::now() + ttl,
            },
        );
        token
    }

    pub async fn add_folder(&self, user_id: Uuid, name: &str, folder_type: FolderType) -> Folder {
        let mut inner = self.inner.write().await;
        let folder = Folder {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            folder_type,
            created_at: inner.tick(),
        };
        inner.folders.push(folder.clone());
        folder
    }

    /// Every stored message, in insertion order.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.read().await.messages.clone()
    }

    /// Number of directory lookup calls served so far.
    pub fn account_lookups(&self) -> usize {
        self.account_lookups.load(Ordering::SeqCst)
    }

    /// While offline, every store call fails with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// While set, only directory lookups (`accounts_by_ids`) fail.
    pub fn set_directory_offline(&self, offline: bool) {
        self.directory_offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MailStore for MemoryMailStore {
    async fn session_account(&self, token: &str) -> Result<Option<Account>, StoreError> {
        self.ensure_online()?;
        let inner = self.inner.read().await;
        let account = inner
            .sessions
            .get(token)
            .filter(|session| session.expires_at > Utc::now())
            .and_then(|session| inner.accounts.get(&session.account_id))
            .cloned();
        Ok(account)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.inner.write().await.sessions.remove(token);
        Ok(())
    }

    async fn accounts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Account>, StoreError> {
        self.ensure_online()?;
        self.account_lookups.fetch_add(1, Ordering::SeqCst);
        if self.directory_offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("directory is offline".to_string()));
        }
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.accounts.get(id))
            .cloned()
            .collect())
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError> {
        self.ensure_online()?;
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|message| filter.matches(message))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, StoreError> {
        self.ensure_online()?;
        let inner = self.inner.read().await;
        Ok(inner.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_message(&self, message: &NewMessage<'_>) -> Result<Message, StoreError> {
        self.ensure_online()?;
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(&message.sender_id) {
            return Err(StoreError::Constraint(format!(
                "sender {} does not reference an account",
                message.sender_id
            )));
        }
        let now = inner.tick();
        let record = Message {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            recipient_email: message.recipient_email.to_string(),
            subject: message.subject.to_string(),
            body: message.body.to_string(),
            is_read: false,
            is_starred: false,
            created_at: now,
            updated_at: now,
            sender_email: None,
        };
        inner.messages.push(record.clone());
        Ok(record)
    }

    async fn update_message(
        &self,
        id: Uuid,
        patch: &MessagePatch,
    ) -> Result<Option<Message>, StoreError> {
        self.ensure_online()?;
        let mut inner = self.inner.write().await;
        let now = inner.tick();
        let Some(message) = inner.messages.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(is_read) = patch.is_read {
            message.is_read = is_read;
        }
        if let Some(is_starred) = patch.is_starred {
            message.is_starred = is_starred;
        }
        message.updated_at = now.max(message.updated_at);
        Ok(Some(message.clone()))
    }

    async fn list_folders(&self, owner_id: Uuid) -> Result<Vec<Folder>, StoreError> {
        self.ensure_online()?;
        let inner = self.inner.read().await;
        let mut folders: Vec<Folder> = inner
            .folders
            .iter()
            .filter(|folder| folder.user_id == owner_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(folders)
    }
}
