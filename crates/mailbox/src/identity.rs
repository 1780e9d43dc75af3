use crate::UNKNOWN_SENDER;
use db::models::email::Message;
use db::services::store::MailStore;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;
use uuid::Uuid;

/// Fills `sender_email` on every message with one batched directory lookup
/// over the distinct sender ids. Misses, and a failed lookup, become
/// [`UNKNOWN_SENDER`].
pub(crate) async fn resolve_senders(store: &dyn MailStore, messages: &mut [Message]) {
    if messages.is_empty() {
        return;
    }

    let ids: Vec<Uuid> = messages
        .iter()
        .map(|m| m.sender_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let directory: HashMap<Uuid, String> = match store.accounts_by_ids(&ids).await {
        Ok(accounts) => accounts.into_iter().map(|a| (a.id, a.email)).collect(),
        Err(e) => {
            warn!(senders = ids.len(), error = %e, "sender lookup failed");
            HashMap::new()
        }
    };

    for message in messages.iter_mut() {
        message.sender_email = Some(
            directory
                .get(&message.sender_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
        );
    }
}
