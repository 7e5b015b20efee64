//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use fund_core::auth::AuthError;
use fund_core::store::StoreError;

use crate::response::ErrorBody;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InsufficientFunds => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Never leak internals to the caller.
            AppError::Internal(detail) => {
                error!(detail, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(ErrorBody::new(status.as_u16(), message));
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                AppError::Unauthenticated("Invalid credentials".into())
            }
            AuthError::NotFound => AppError::NotFound("User not found".into()),
            // Rejection kinds are distinguished internally but collapse to
            // one response class externally.
            AuthError::Token(kind) => {
                debug!(%kind, "token rejected");
                AppError::Unauthenticated("Invalid or expired token".into())
            }
            AuthError::Store(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(resource) => {
                AppError::NotFound(format!("{} not found", capitalize(resource)))
            }
            StoreError::Conflict(resource) => {
                AppError::Conflict(format!("{} already exists", capitalize(resource)))
            }
            StoreError::InsufficientFunds => AppError::InsufficientFunds,
            StoreError::Db(e) => AppError::Internal(format!("database error: {e}")),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
