use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use storage::error::StorageError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A single webhook event that cannot be turned into a chat message
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Unreadable request body: {0}")]
    UnreadableBody(String),

    #[error("Missing or invalid webhook signature")]
    InvalidSignature,

    #[error("No leaderboard for chat {0}")]
    LeaderboardNotFound(String),

    #[error("Stored leaderboard of chat {chat_id} is corrupt: {reason}")]
    CorruptLeaderboard { chat_id: String, reason: String },
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEvent(_) | Self::Validation(_) | Self::UnreadableBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::LeaderboardNotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::CorruptLeaderboard { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Storage(_) | Self::CorruptLeaderboard { .. } => {
                tracing::error!("{}", self);
                json!({ "error": "An internal error occurred" })
            }
            Self::Validation(errors) => json!({
                "error": "Validation failed",
                "details": validation_details(errors)
            }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

/// `field: message` per failed check, falling back to the validator code
fn validation_details(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect()
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

pub type WebResult<T> = Result<T, WebError>;
