use db::services::error::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Message {0} not found")]
    NotFound(Uuid),

    #[error("Message {0} does not belong to the caller")]
    Forbidden(Uuid),

    #[error("Rejected by backend: {0}")]
    Validation(String),
}

impl From<StoreError> for MailboxError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => MailboxError::BackendUnavailable(msg),
            StoreError::Constraint(msg) => MailboxError::Validation(msg),
            StoreError::Corrupt(msg) => MailboxError::BackendUnavailable(msg),
        }
    }
}
