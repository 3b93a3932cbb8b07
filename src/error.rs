use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Locally detected missing or malformed input. Never reaches the backend.
    Validation(String),
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    /// The backend answered with a non-success status or an unreadable body.
    /// The message is already prefixed with the route context.
    Upstream(String),
    /// The backend could not be reached at all.
    Transport(String),
    Configuration(String),
    TooManyRequests(String),
    Serialization(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_)
            | AppError::Transport(_)
            | AppError::Configuration(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller, without the variant prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Upstream(msg)
            | AppError::Transport(msg)
            | AppError::Configuration(msg)
            | AppError::TooManyRequests(msg)
            | AppError::Serialization(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    /// Prefix the message with the proxy context, e.g. `"Topics GET: "`.
    pub fn with_context(self, context: &str) -> Self {
        let prefixed = |msg: String| format!("{}: {}", context, msg);
        match self {
            AppError::Upstream(msg) => AppError::Upstream(prefixed(msg)),
            AppError::Transport(msg) => AppError::Upstream(prefixed(msg)),
            AppError::Serialization(msg) => AppError::Upstream(prefixed(msg)),
            AppError::Internal(msg) => AppError::Upstream(prefixed(msg)),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::TooManyRequests(msg) => write!(f, "Too many requests: {}", msg),
            AppError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Upstream(msg) | AppError::Transport(msg) => {
                tracing::warn!("Proxy failure: {}", msg);
            }
            AppError::Internal(msg) | AppError::Configuration(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            _ => {}
        }

        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
