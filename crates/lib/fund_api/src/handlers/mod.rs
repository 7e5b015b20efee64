//! Request handlers.

pub mod auth;
pub mod deposits;
pub mod payments;
pub mod users;

use axum::http::StatusCode;

/// `GET /v1/health`: liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
