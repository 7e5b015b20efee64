//! SQL store for users, deposits, and payments.

pub mod deposits;
pub mod filter;
pub mod payments;
pub mod users;

use thiserror::Error;

/// Store-level errors. `NotFound`, `Conflict`, and `InsufficientFunds` are
/// expected outcomes; `Db` is an incident.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}
