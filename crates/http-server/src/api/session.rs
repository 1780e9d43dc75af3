use crate::core::{ApiError, AppState, AuthSession};
use axum::{extract::State, http::StatusCode, Json};
use db::models::account::Account;

/// GET /api/session
pub async fn current_user_handler(AuthSession(session): AuthSession) -> Json<Account> {
    Json(session.account)
}

/// DELETE /api/session
pub async fn sign_out_handler(
    State(app_state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<StatusCode, ApiError> {
    app_state.client.sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
