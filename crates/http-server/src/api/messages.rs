use crate::core::{ApiError, AppJson, AppPath, AppQuery, AppState, AuthSession};
use axum::{extract::State, http::StatusCode, Json};
use db::models::email::Message;
use mailbox::FolderKey;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ListQuery {
    pub folder: Option<String>,
}

#[derive(Deserialize)]
pub struct SendRequest {
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct StarRequest {
    pub starred: bool,
}

/// GET /api/messages?folder=<key>
pub async fn list_messages_handler(
    State(app_state): State<AppState>,
    AuthSession(session): AuthSession,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let folder = query
        .folder
        .as_deref()
        .map(FolderKey::from)
        .unwrap_or_default();
    let messages = app_state.client.list_messages(&session, &folder).await?;
    Ok(Json(messages))
}

/// POST /api/messages
pub async fn send_message_handler(
    State(app_state): State<AppState>,
    AuthSession(session): AuthSession,
    AppJson(payload): AppJson<SendRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    validate_send(&payload)?;
    let message = app_state
        .client
        .send_message(
            &session,
            payload.recipient_email.trim(),
            &payload.subject,
            &payload.body,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/messages/:id/read
pub async fn mark_read_handler(
    State(app_state): State<AppState>,
    AuthSession(session): AuthSession,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Message>, ApiError> {
    let message = app_state.client.mark_read(&session, id).await?;
    Ok(Json(message))
}

/// PUT /api/messages/:id/star
pub async fn toggle_star_handler(
    State(app_state): State<AppState>,
    AuthSession(session): AuthSession,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<StarRequest>,
) -> Result<Json<Message>, ApiError> {
    let message = app_state
        .client
        .toggle_star(&session, id, payload.starred)
        .await?;
    Ok(Json(message))
}

/// Compose-form checks; the mailbox client itself does not re-validate.
fn validate_send(payload: &SendRequest) -> Result<(), ApiError> {
    for (field, value) in [
        ("recipient_email", &payload.recipient_email),
        ("subject", &payload.subject),
        ("body", &payload.body),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} must not be empty.", field)));
        }
    }
    Ok(())
}
