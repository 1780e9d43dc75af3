use crate::auth::Session;
use crate::error::MailboxError;
use crate::folder_key::FolderKey;
use crate::identity::resolve_senders;
use db::models::account::Account;
use db::models::email::{Message, MessageFilter, MessagePatch, NewMessage};
use db::models::folder::Folder;
use db::services::store::MailStore;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Brokers every message and folder operation between a caller and the
/// backend store. Holds no state of its own.
#[derive(Clone)]
pub struct MailboxClient {
    store: Arc<dyn MailStore>,
}

impl MailboxClient {
    pub fn new(store: Arc<dyn MailStore>) -> Self {
        Self { store }
    }

    /// Re-resolves the caller through the backend. Nothing else touches the
    /// store until this succeeds.
    async fn viewer(&self, session: &Session) -> Result<Account, MailboxError> {
        self.store
            .session_account(&session.token)
            .await?
            .ok_or(MailboxError::Unauthenticated)
    }

    /// Lists one folder view, newest first.
    ///
    /// `Inbox` holds messages addressed to the caller, with `sender_email`
    /// resolved. `Sent` holds messages the caller sent. Other keys have no
    /// membership rule and list nothing.
    #[instrument(skip(self, session, folder), fields(folder = %folder))]
    pub async fn list_messages(
        &self,
        session: &Session,
        folder: &FolderKey,
    ) -> Result<Vec<Message>, MailboxError> {
        let viewer = self.viewer(session).await?;

        let filter = match folder {
            FolderKey::Inbox => MessageFilter::RecipientEmail(viewer.email.clone()),
            FolderKey::Sent => MessageFilter::SenderId(viewer.id),
            other => {
                debug!(folder = %other, "folder has no membership rule");
                return Ok(Vec::new());
            }
        };

        let mut messages = self.store.list_messages(&filter).await?;
        if *folder == FolderKey::Inbox {
            resolve_senders(self.store.as_ref(), &mut messages).await;
        }
        debug!(count = messages.len(), "listed messages");
        Ok(messages)
    }

    /// Sends a message from the caller. The sender is always the session's
    /// account; field contents are left for the backend to judge.
    #[instrument(skip(self, session, subject, body))]
    pub async fn send_message(
        &self,
        session: &Session,
        recipient_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<Message, MailboxError> {
        let viewer = self.viewer(session).await?;
        let message = self
            .store
            .insert_message(&NewMessage {
                sender_id: viewer.id,
                recipient_email,
                subject,
                body,
            })
            .await?;
        info!(message = %message.id, "message sent");
        Ok(message)
    }

    /// Marks a message read. Repeating the call leaves it read.
    #[instrument(skip(self, session))]
    pub async fn mark_read(
        &self,
        session: &Session,
        message_id: Uuid,
    ) -> Result<Message, MailboxError> {
        self.update_owned(session, message_id, MessagePatch::read())
            .await
    }

    /// Sets the starred flag to `starred`.
    #[instrument(skip(self, session))]
    pub async fn toggle_star(
        &self,
        session: &Session,
        message_id: Uuid,
        starred: bool,
    ) -> Result<Message, MailboxError> {
        self.update_owned(session, message_id, MessagePatch::starred(starred))
            .await
    }

    /// The caller's folders, oldest first.
    #[instrument(skip(self, session))]
    pub async fn list_folders(&self, session: &Session) -> Result<Vec<Folder>, MailboxError> {
        let viewer = self.viewer(session).await?;
        Ok(self.store.list_folders(viewer.id).await?)
    }

    /// Builds the session for a bearer token. Unknown and expired tokens are
    /// `Unauthenticated`.
    pub async fn authenticate(&self, token: &str) -> Result<Session, MailboxError> {
        Session::from_token(self.store.as_ref(), token).await
    }

    /// Revokes the session's token in the backend.
    #[instrument(skip(self, session), fields(account = %session.account.id))]
    pub async fn sign_out(&self, session: &Session) -> Result<(), MailboxError> {
        self.store.delete_session(&session.token).await?;
        info!("signed out");
        Ok(())
    }

    // Applies `patch` only if the caller sent or received the message.
    async fn update_owned(
        &self,
        session: &Session,
        message_id: Uuid,
        patch: MessagePatch,
    ) -> Result<Message, MailboxError> {
        let viewer = self.viewer(session).await?;
        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or(MailboxError::NotFound(message_id))?;

        if message.sender_id != viewer.id && message.recipient_email != viewer.email {
            warn!(message = %message_id, account = %viewer.id, "update refused");
            return Err(MailboxError::Forbidden(message_id));
        }

        self.store
            .update_message(message_id, &patch)
            .await?
            .ok_or(MailboxError::NotFound(message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNKNOWN_SENDER;
    use chrono::Duration;
    use db::models::folder::FolderType;
    use db::services::memory::MemoryMailStore;

    struct Fixture {
        store: Arc<MemoryMailStore>,
        client: MailboxClient,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryMailStore::new());
            let client = MailboxClient::new(store.clone());
            Self { store, client }
        }

        async fn sign_in(&self, email: &str) -> Session {
            let account = self.store.add_account(email).await;
            let token = self.store.open_session(account.id, Duration::hours(1)).await;
            Session { token, account }
        }
    }

    fn assert_newest_first(messages: &[Message]) {
        assert!(messages
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn sent_message_shows_in_both_views() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let bob = fx.sign_in("bob@x.com").await;

        let sent = fx
            .client
            .send_message(&alice, "bob@x.com", "Hi", "Hello")
            .await
            .unwrap();

        let alice_sent = fx.client.list_messages(&alice, &FolderKey::Sent).await.unwrap();
        assert_eq!(alice_sent.len(), 1);
        assert_eq!(alice_sent[0].id, sent.id);
        assert_eq!(alice_sent[0].recipient_email, "bob@x.com");
        assert_eq!(alice_sent[0].sender_email, None);

        let bob_inbox = fx.client.list_messages(&bob, &FolderKey::Inbox).await.unwrap();
        assert_eq!(bob_inbox.len(), 1);
        assert_eq!(bob_inbox[0].id, sent.id);
        assert_eq!(bob_inbox[0].sender_email.as_deref(), Some("alice@x.com"));
    }

    #[tokio::test]
    async fn send_sets_defaults_and_caller_as_sender() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;

        let sent = fx
            .client
            .send_message(&alice, "bob@x.com", "Hi", "Hello")
            .await
            .unwrap();

        assert_eq!(sent.sender_id, alice.account.id);
        assert!(!sent.is_read);
        assert!(!sent.is_starred);
        assert_eq!(sent.created_at, sent.updated_at);
        assert_eq!(fx.store.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn listings_match_filter_newest_first() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let bob = fx.sign_in("bob@x.com").await;
        let carol = fx.sign_in("carol@x.com").await;

        for (from, to) in [
            (&alice, "bob@x.com"),
            (&carol, "bob@x.com"),
            (&bob, "alice@x.com"),
            (&alice, "carol@x.com"),
            (&carol, "bob@x.com"),
        ] {
            fx.client.send_message(from, to, "s", "b").await.unwrap();
        }

        let inbox = fx.client.list_messages(&bob, &FolderKey::Inbox).await.unwrap();
        assert_eq!(inbox.len(), 3);
        assert!(inbox.iter().all(|m| m.recipient_email == "bob@x.com"));
        assert_newest_first(&inbox);

        let sent = fx.client.list_messages(&alice, &FolderKey::Sent).await.unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.sender_id == alice.account.id));
        assert_newest_first(&sent);
    }

    #[tokio::test]
    async fn inbox_resolves_senders_in_one_batch() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let bob = fx.sign_in("bob@x.com").await;
        let carol = fx.sign_in("carol@x.com").await;
        for from in [&alice, &carol, &alice] {
            fx.client
                .send_message(from, "bob@x.com", "s", "b")
                .await
                .unwrap();
        }
        let before = fx.store.account_lookups();

        let inbox = fx.client.list_messages(&bob, &FolderKey::Inbox).await.unwrap();

        assert_eq!(fx.store.account_lookups() - before, 1);
        let senders: Vec<_> = inbox
            .iter()
            .map(|m| m.sender_email.clone().unwrap())
            .collect();
        assert_eq!(senders, ["alice@x.com", "carol@x.com", "alice@x.com"]);
    }

    #[tokio::test]
    async fn empty_inbox_skips_lookup() {
        let fx = Fixture::new();
        let bob = fx.sign_in("bob@x.com").await;

        let inbox = fx.client.list_messages(&bob, &FolderKey::Inbox).await.unwrap();

        assert!(inbox.is_empty());
        assert_eq!(fx.store.account_lookups(), 0);
    }

    #[tokio::test]
    async fn unresolved_sender_is_unknown() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        fx.client
            .send_message(&alice, "bob@x.com", "Hi", "Hello")
            .await
            .unwrap();
        let mut inbox = fx
            .store
            .list_messages(&MessageFilter::RecipientEmail("bob@x.com".to_string()))
            .await
            .unwrap();
        let orphan = Message {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            ..inbox[0].clone()
        };
        inbox.push(orphan);

        resolve_senders(&*fx.store, &mut inbox).await;

        assert_eq!(inbox[0].sender_email.as_deref(), Some("alice@x.com"));
        assert_eq!(inbox[1].sender_email.as_deref(), Some(UNKNOWN_SENDER));
    }

    #[tokio::test]
    async fn failed_sender_lookup_still_lists_inbox() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let bob = fx.sign_in("bob@x.com").await;
        fx.client
            .send_message(&alice, "bob@x.com", "Hi", "Hello")
            .await
            .unwrap();
        fx.store.set_directory_offline(true);

        let inbox = fx.client.list_messages(&bob, &FolderKey::Inbox).await.unwrap();

        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].sender_email.as_deref(), Some(UNKNOWN_SENDER));
    }

    #[tokio::test]
    async fn authenticate_and_sign_out() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;

        let session = fx.client.authenticate(&alice.token).await.unwrap();
        assert_eq!(session, alice);

        fx.client.sign_out(&session).await.unwrap();

        assert!(matches!(
            fx.client.authenticate(&alice.token).await,
            Err(MailboxError::Unauthenticated)
        ));
        assert!(matches!(
            fx.client.list_folders(&alice).await,
            Err(MailboxError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn other_folder_keys_list_nothing() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        fx.client
            .send_message(&alice, "alice@x.com", "note", "to self")
            .await
            .unwrap();

        for key in [
            FolderKey::Draft,
            FolderKey::Trash,
            FolderKey::Custom("receipts".to_string()),
        ] {
            assert!(fx.client.list_messages(&alice, &key).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn message_to_self_appears_in_inbox_and_sent() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let sent = fx
            .client
            .send_message(&alice, "alice@x.com", "note", "to self")
            .await
            .unwrap();

        let inbox = fx.client.list_messages(&alice, &FolderKey::Inbox).await.unwrap();
        let outbox = fx.client.list_messages(&alice, &FolderKey::Sent).await.unwrap();
        assert_eq!(inbox[0].id, sent.id);
        assert_eq!(outbox[0].id, sent.id);
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let bob = fx.sign_in("bob@x.com").await;
        let sent = fx
            .client
            .send_message(&alice, "bob@x.com", "Hi", "Hello")
            .await
            .unwrap();

        let once = fx.client.mark_read(&bob, sent.id).await.unwrap();
        let twice = fx.client.mark_read(&bob, sent.id).await.unwrap();

        assert!(once.is_read && twice.is_read);
        assert!(!twice.is_starred);
        assert!(once.updated_at >= sent.updated_at);
        assert!(twice.updated_at >= once.updated_at);
        assert_eq!(fx.store.messages().await, vec![twice]);
    }

    #[tokio::test]
    async fn star_sets_requested_state() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let sent = fx
            .client
            .send_message(&alice, "bob@x.com", "Hi", "Hello")
            .await
            .unwrap();

        let first = fx.client.toggle_star(&alice, sent.id, true).await.unwrap();
        let second = fx.client.toggle_star(&alice, sent.id, true).await.unwrap();
        assert!(first.is_starred && second.is_starred);
        assert!(second.updated_at >= first.updated_at);

        let cleared = fx.client.toggle_star(&alice, sent.id, false).await.unwrap();
        assert!(!cleared.is_starred);
        assert_eq!(fx.store.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn strangers_cannot_flag_messages() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let mallory = fx.sign_in("mallory@x.com").await;
        let sent = fx
            .client
            .send_message(&alice, "bob@x.com", "Hi", "Hello")
            .await
            .unwrap();

        assert!(matches!(
            fx.client.mark_read(&mallory, sent.id).await,
            Err(MailboxError::Forbidden(id)) if id == sent.id
        ));
        assert!(matches!(
            fx.client.toggle_star(&mallory, sent.id, true).await,
            Err(MailboxError::Forbidden(_))
        ));
        assert_eq!(fx.store.messages().await, vec![sent]);
    }

    #[tokio::test]
    async fn unknown_message_is_not_found() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let id = Uuid::new_v4();

        assert!(matches!(
            fx.client.mark_read(&alice, id).await,
            Err(MailboxError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn dead_session_fails_without_side_effects() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let sent = fx
            .client
            .send_message(&alice, "alice@x.com", "Hi", "Hello")
            .await
            .unwrap();
        fx.store.delete_session(&alice.token).await.unwrap();
        let lookups = fx.store.account_lookups();

        assert!(matches!(
            fx.client.send_message(&alice, "bob@x.com", "x", "y").await,
            Err(MailboxError::Unauthenticated)
        ));
        assert!(matches!(
            fx.client.mark_read(&alice, sent.id).await,
            Err(MailboxError::Unauthenticated)
        ));
        assert!(matches!(
            fx.client.toggle_star(&alice, sent.id, true).await,
            Err(MailboxError::Unauthenticated)
        ));
        assert!(matches!(
            fx.client.list_messages(&alice, &FolderKey::Inbox).await,
            Err(MailboxError::Unauthenticated)
        ));
        assert!(matches!(
            fx.client.list_folders(&alice).await,
            Err(MailboxError::Unauthenticated)
        ));

        assert_eq!(fx.store.messages().await, vec![sent]);
        assert_eq!(fx.store.account_lookups(), lookups);
    }

    #[tokio::test]
    async fn backend_outage_propagates() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        fx.store.set_offline(true);

        assert!(matches!(
            fx.client.list_messages(&alice, &FolderKey::Sent).await,
            Err(MailboxError::BackendUnavailable(_))
        ));
        assert!(matches!(
            fx.client.send_message(&alice, "bob@x.com", "x", "y").await,
            Err(MailboxError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn folders_are_the_callers_own() {
        let fx = Fixture::new();
        let alice = fx.sign_in("alice@x.com").await;
        let bob = fx.sign_in("bob@x.com").await;
        let inbox = fx.store.add_folder(alice.account.id, "Inbox", FolderType::Inbox).await;
        fx.store.add_folder(bob.account.id, "Inbox", FolderType::Inbox).await;
        let sent = fx.store.add_folder(alice.account.id, "Sent", FolderType::Sent).await;

        let folders = fx.client.list_folders(&alice).await.unwrap();

        assert_eq!(folders, vec![inbox, sent]);
    }
}
