use crate::core::{ApiError, AppState, AuthSession};
use axum::{extract::State, Json};
use db::models::folder::Folder;

/// GET /api/folders
pub async fn list_folders_handler(
    State(app_state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<Vec<Folder>>, ApiError> {
    let folders = app_state.client.list_folders(&session).await?;
    Ok(Json(folders))
}
