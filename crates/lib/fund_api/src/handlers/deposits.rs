//! Deposit request handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use fund_core::models::Deposit;
use fund_core::store::deposits;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::params;
use crate::response::{Envelope, SumResponse, page, success};

#[derive(Debug, Deserialize)]
pub struct CreateDepositRequest {
    pub amount: i64,
}

/// Parse the `id` query parameter shared by the single-row lookups.
pub(crate) fn id_param(query: &HashMap<String, String>) -> Result<Uuid, AppError> {
    let raw = query
        .get("id")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("Parameter 'id' required".into()))?;
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation("parameter 'id' must be a UUID".into()))
}

/// `POST /v1/users/{username}/deposit`: credit the user's balance.
pub async fn post_deposit(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreateDepositRequest>,
) -> AppResult<StatusCode> {
    user.require_owner(&username)?;

    if body.amount <= 0 {
        return Err(AppError::Validation(
            "Deposit amount must be greater than 0".into(),
        ));
    }

    let deposit = Deposit {
        id: Uuid::now_v7(),
        username,
        amount: body.amount,
        time: Utc::now(),
    };
    deposits::create_deposit(&state.pool, &deposit).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /v1/users/{username}/deposit?id=`: fetch a single deposit.
pub async fn get_deposit(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<Deposit>>> {
    user.require_owner(&username)?;

    let id = id_param(&query)?;
    let deposit = deposits::get_deposit(&state.pool, &username, id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Deposit {id} not found for user {username}"))
        })?;
    Ok(success(deposit))
}

/// `GET /v1/users/{username}/deposits`: filtered, paginated listing.
pub async fn list_deposits(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<Vec<Deposit>>>> {
    user.require_owner(&username)?;

    let filter = params::range_filter(&query)?;
    let window = params::page(&query)?;
    let rows = deposits::list_deposits(&state.pool, &username, &filter, window).await?;

    Ok(page(&uri, window, rows))
}

/// `GET /v1/users/{username}/deposits/sum`: filtered sum, no pagination.
pub async fn sum_deposits(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<SumResponse>>> {
    user.require_owner(&username)?;

    let filter = params::range_filter(&query)?;
    let sum = deposits::sum_deposits(&state.pool, &username, &filter).await?;
    Ok(success(SumResponse { sum }))
}
