use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::llm_client::LlmError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid name or password")]
    InvalidCredentials,

    #[error("A consultant named '{0}' is already registered")]
    DuplicateName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Please log in first")]
    Unauthorized,

    #[error("Only the administrator can do that")]
    Forbidden,

    #[error("Your account could not be found; you have been logged out")]
    SessionLost,

    #[error("{0} is already in progress")]
    InProgress(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("AI request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Resume upload failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Render error: {0}")]
    Render(#[from] tera::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Errors the dashboard shows to the user as a notification and recovers from.
    /// Everything else leaves the process answering with a 5xx.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            AppError::Storage(_) | AppError::Render(_) | AppError::Internal(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            AppError::DuplicateName(_) => (StatusCode::CONFLICT, "DUPLICATE_NAME", self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Unauthorized | AppError::SessionLost => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AppError::InProgress(_) => (StatusCode::CONFLICT, "IN_PROGRESS", self.to_string()),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Document(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DOCUMENT_ERROR",
                e.to_string(),
            ),
            AppError::Render(e) => {
                tracing::error!("Render error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The page could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
