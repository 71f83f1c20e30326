//! Unified error handling
//!
//! Every operation signals a typed failure; the HTTP mapping is applied
//! exactly once, in the [`IntoResponse`] impl. Handlers never format
//! status codes themselves.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing id, missing file, expired session (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Uniqueness or foreign-key violation at the storage layer (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected internal failure (500); detail is logged, never sent
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("duplicate value violates a unique constraint".into())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::Conflict("operation violates a foreign-key constraint".into())
            }
            _ => AppError::Internal(format!("database error: {e}")),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Multipart error: {e}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {e}"))
    }
}
