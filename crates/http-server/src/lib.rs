use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod api;
pub mod core;

pub use crate::core::{AppConfig, AppState};

/// Routes exposing the mailbox operations as JSON over HTTP.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/session",
            get(api::session::current_user_handler).delete(api::session::sign_out_handler),
        )
        .route("/api/folders", get(api::folders::list_folders_handler))
        .route(
            "/api/messages",
            get(api::messages::list_messages_handler).post(api::messages::send_message_handler),
        )
        .route(
            "/api/messages/:id/read",
            post(api::messages::mark_read_handler),
        )
        .route(
            "/api/messages/:id/star",
            put(api::messages::toggle_star_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
