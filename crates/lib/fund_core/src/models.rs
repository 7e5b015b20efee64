//! Domain models.
//!
//! These serialize directly into the `data` field of API responses, so the
//! field names here are the wire names.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user profile as exposed over the API. The password hash never leaves
/// the store layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
    pub balance: i64,
}

/// A single deposit into a user's balance.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Deposit {
    pub id: Uuid,
    pub username: String,
    pub amount: i64,
    pub time: DateTime<Utc>,
}

/// An outbound payment from a user's balance.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub username: String,
    pub amount: i64,
    pub time: DateTime<Utc>,
    pub url: String,
}
