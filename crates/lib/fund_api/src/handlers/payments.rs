//! Payment request handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use fund_core::models::Payment;
use fund_core::store::payments;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::handlers::deposits::id_param;
use crate::middleware::auth::AuthenticatedUser;
use crate::params;
use crate::response::{Envelope, SumResponse, page, success};

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: i64,
    pub url: String,
}

/// `POST /v1/users/{username}/payment`: debit the user's balance.
///
/// The store performs the balance check and decrement atomically; a balance
/// short of the amount is a 400 `Insufficient funds`, never a negative
/// balance.
pub async fn post_payment(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Json(body): Json<CreatePaymentRequest>,
) -> AppResult<StatusCode> {
    user.require_owner(&username)?;

    if body.amount <= 0 {
        return Err(AppError::Validation(
            "Payment amount must be greater than 0".into(),
        ));
    }
    if body.url.is_empty() {
        return Err(AppError::Validation("Payment url cannot be empty".into()));
    }

    let payment = Payment {
        id: Uuid::now_v7(),
        username,
        amount: body.amount,
        time: Utc::now(),
        url: body.url,
    };
    payments::create_payment(&state.pool, &payment).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /v1/users/{username}/payment?id=`: fetch a single payment.
pub async fn get_payment(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<Payment>>> {
    user.require_owner(&username)?;

    let id = id_param(&query)?;
    let payment = payments::get_payment(&state.pool, &username, id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Payment {id} not found for user {username}"))
        })?;
    Ok(success(payment))
}

/// `GET /v1/users/{username}/payments`: filtered, paginated listing. Adds
/// the `url` substring filter on top of the shared range bounds.
pub async fn list_payments(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<Vec<Payment>>>> {
    user.require_owner(&username)?;

    let filter = params::payment_filter(&query)?;
    let window = params::page(&query)?;
    let rows = payments::list_payments(&state.pool, &username, &filter, window).await?;

    Ok(page(&uri, window, rows))
}

/// `GET /v1/users/{username}/payments/sum`: filtered sum, no pagination.
pub async fn sum_payments(
    State(state): State<AppState>,
    Path(username): Path<String>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Envelope<SumResponse>>> {
    user.require_owner(&username)?;

    let filter = params::payment_filter(&query)?;
    let sum = payments::sum_payments(&state.pool, &username, &filter).await?;
    Ok(success(SumResponse { sum }))
}
