use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use db::services::store::MailStore;
use mailbox::{MailboxClient, MailboxError, Session};
use serde_json::json;
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

// Define a struct to hold our application's shared state.
#[derive(Clone)]
pub struct AppState {
    pub client: MailboxClient,
}

impl AppState {
    pub fn new(store: Arc<dyn MailStore>) -> Self {
        Self {
            client: MailboxClient::new(store),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} is not a valid number: {1}")]
    Invalid(&'static str, String),
}

/// Server settings read from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub session_sweep_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            port: parse_var("PORT", 3001)?,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            session_sweep_secs: parse_var("SESSION_SWEEP_SECS", 60)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

// Define a custom error type for our API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Mailbox(#[from] MailboxError),
}

// Malformed requests answer with the same JSON error body as everything else.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// `axum::Json` with rejections reported as `ApiError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` with rejections reported as `ApiError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// `axum::extract::Query` with rejections reported as `ApiError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

// Implement `IntoResponse` for `ApiError` to convert it into an HTTP response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Mailbox(MailboxError::Unauthenticated) => {
                (StatusCode::UNAUTHORIZED, "Not authenticated.".to_string())
            }
            ApiError::Mailbox(e @ MailboxError::Forbidden(_)) => {
                (StatusCode::FORBIDDEN, e.to_string())
            }
            ApiError::Mailbox(e @ MailboxError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Mailbox(MailboxError::Validation(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            ApiError::Mailbox(MailboxError::BackendUnavailable(msg)) => {
                error!("Backend unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The mail backend is unavailable.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

/// Extracts and validates the `Authorization: Bearer <token>` session.
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(MailboxError::Unauthenticated)?;

        let session = state.client.authenticate(token).await?;
        Ok(AuthSession(session))
    }
}

// The auth scheme name is case-insensitive (RFC 9110 section 11.1).
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
