//! Authentication and authorization logic.
//!
//! Provides the token codec, the token lifecycle service, password hashing,
//! and the credential store interface backing revocation checks.

pub mod password;
pub mod service;
pub mod store;
pub mod token;

use thiserror::Error;

use crate::store::StoreError;

/// Why a token was rejected. Each kind is distinguishable so the HTTP layer
/// can decide how much to reveal; externally they all collapse to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("bad token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("wrong token type")]
    WrongType,

    #[error("token revoked")]
    Revoked,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}
