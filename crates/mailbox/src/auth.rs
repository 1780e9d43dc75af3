use crate::error::MailboxError;
use db::models::account::Account;
use db::services::store::MailStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Explicit session context handed to every [`MailboxClient`] call.
///
/// [`MailboxClient`]: crate::MailboxClient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

impl Session {
    /// Builds a session from a bearer token, failing with `Unauthenticated`
    /// when the token is unknown or expired.
    pub async fn from_token(store: &dyn MailStore, token: &str) -> Result<Self, MailboxError> {
        let account = store
            .session_account(token)
            .await?
            .ok_or(MailboxError::Unauthenticated)?;
        Ok(Session {
            token: token.to_string(),
            account,
        })
    }
}

/// Holds the signed-in session of one client and notifies subscribers when it changes.
pub struct Auth {
    store: Arc<dyn MailStore>,
    current: watch::Sender<Option<Session>>,
}

impl Auth {
    pub fn new(store: Arc<dyn MailStore>) -> Self {
        let (current, _) = watch::channel(None);
        Self { store, current }
    }

    /// Validates a stored token and makes it the current session.
    pub async fn restore(&self, token: &str) -> Result<Session, MailboxError> {
        let session = Session::from_token(self.store.as_ref(), token).await?;
        info!(account = %session.account.id, "session restored");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// The signed-in account, re-checked against the backend. A session the
    /// backend no longer honours is dropped.
    pub async fn current_user(&self) -> Result<Account, MailboxError> {
        let session = self
            .current_session()
            .ok_or(MailboxError::Unauthenticated)?;
        match self.store.session_account(&session.token).await? {
            Some(account) => Ok(account),
            None => {
                self.current.send_replace(None);
                Err(MailboxError::Unauthenticated)
            }
        }
    }

    /// Revokes the current token and clears the session. Signing out with
    /// no session is a no-op.
    pub async fn sign_out(&self) -> Result<(), MailboxError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        self.store.delete_session(&session.token).await?;
        self.current.send_replace(None);
        info!(account = %session.account.id, "signed out");
        Ok(())
    }

    /// Receives every session change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}
