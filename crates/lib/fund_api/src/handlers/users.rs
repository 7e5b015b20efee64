//! User account request handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use fund_core::auth::password;
use fund_core::models::User;
use fund_core::store::users;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::response::{Envelope, success};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

/// `POST /v1/users`: register a new account.
pub async fn post_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<StatusCode> {
    if body.username.is_empty() {
        return Err(AppError::Validation("Username cannot be empty".into()));
    }
    check_password(&body.password)?;
    if body.email.is_empty() {
        return Err(AppError::Validation("Email cannot be empty".into()));
    }

    let hash = password::hash_password(&body.password)?;
    users::create_user(&state.pool, &body.username, &hash, &body.email).await?;

    info!(username = %body.username, "created user");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /v1/users/exists?username=`: check username availability.
pub async fn get_user_exists(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<ExistsResponse>>> {
    let username = query
        .get("username")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("Parameter 'username' required".into()))?;

    let exists = users::user_exists(&state.pool, username).await?;
    Ok(success(ExistsResponse { exists }))
}

/// `GET /v1/users/{username}`: fetch the authenticated user's profile.
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<Envelope<User>>> {
    user.require_owner(&username)?;

    let profile = users::get_user(&state.pool, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;
    Ok(success(profile))
}

/// `PUT /v1/users/{username}`: update email and/or password.
pub async fn put_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<StatusCode> {
    user.require_owner(&username)?;

    let hash = match &body.password {
        Some(password) => {
            check_password(password)?;
            Some(password::hash_password(password)?)
        }
        None => None,
    };
    if let Some(email) = &body.email
        && email.is_empty()
    {
        return Err(AppError::Validation("Email cannot be empty".into()));
    }

    let found = users::update_user(
        &state.pool,
        &username,
        body.email.as_deref(),
        hash.as_deref(),
    )
    .await?;
    if !found {
        return Err(AppError::NotFound(format!("User {username} not found")));
    }

    info!(username, "updated user");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/users/{username}`: delete the account and its history.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<StatusCode> {
    user.require_owner(&username)?;

    let found = users::delete_user(&state.pool, &username).await?;
    if !found {
        return Err(AppError::NotFound(format!("User {username} not found")));
    }

    info!(username, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}
