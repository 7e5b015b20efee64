//! Token issuance and revocation handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use fund_core::auth::service;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthenticatedUser, bearer_token};
use crate::response::{Envelope, success};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Parse `Authorization: Basic <base64(username:password)>`.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".into()))?;

    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| AppError::Unauthenticated("Invalid authorization scheme".into()))?;

    let decoded = BASE64
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AppError::Unauthenticated("Invalid basic auth encoding".into()))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AppError::Unauthenticated("Invalid basic auth encoding".into()))?;
    Ok((username.to_string(), password.to_string()))
}

/// `GET /v1/users/{username}/authorize`: authenticate with Basic
/// credentials and receive a refresh token. A successful login clears any
/// earlier revoke-all.
pub async fn authorize(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<Envelope<TokenResponse>>> {
    let (credential_user, password) = basic_credentials(&headers)?;
    if credential_user != username {
        return Err(AppError::Forbidden(
            "Credentials do not match the addressed user".into(),
        ));
    }

    let token = service::issue_refresh_token(
        &state.pool,
        &username,
        &password,
        state.config.jwt_secret.as_bytes(),
        state.config.refresh_token_ttl,
    )
    .await?;

    Ok(success(TokenResponse { token }))
}

/// `GET /v1/users/{username}/token`: exchange the presented refresh token
/// (already validated by the refresh guard) for an access token.
pub async fn get_access_token(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> AppResult<Json<Envelope<TokenResponse>>> {
    user.require_owner(&username)?;

    let refresh = bearer_token(&headers)?;
    let token = service::issue_access_token(
        &state.pool,
        refresh,
        state.config.jwt_secret.as_bytes(),
        state.config.access_token_ttl,
    )
    .await?;

    Ok(success(TokenResponse { token }))
}

/// `DELETE /v1/users/{username}/token`: revoke every outstanding token for
/// the user, regardless of expiry. The next successful login re-authorizes.
pub async fn revoke_tokens(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<StatusCode> {
    user.require_owner(&username)?;

    service::revoke_all(&state.pool, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
