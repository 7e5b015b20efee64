//! Token codec: signed, typed, expiring JWTs (HS256).
//!
//! The codec only guarantees integrity: it verifies the signature and the
//! token structure. Expiry, type, and revocation checks belong to the
//! token service so that each rejection reason stays distinguishable.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{AuthError, TokenError};

/// The two token tiers. The type is carried in the claims and checked by
/// every caller; a refresh token is never accepted where an access token is
/// required, or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Refresh,
    Access,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Refresh => write!(f, "refresh"),
            TokenType::Access => write!(f, "access"),
        }
    }
}

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, the username.
    pub sub: String,
    /// Token tier.
    pub typ: TokenType,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Sign claims into a compact token using the process-wide secret.
pub fn encode_token(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("token encode: {e}")))
}

/// Verify the signature and structure of a token and return its claims.
///
/// Expiry is deliberately not validated here; `exp` is handed back to the
/// caller untouched.
pub fn decode_token(token: &str, secret: &[u8]) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        })
}
