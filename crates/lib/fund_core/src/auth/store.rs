//! Credential store interface.
//!
//! The token service only ever touches user records through this trait: the
//! password verifier for login and the per-user revocation marker for
//! validation. Keeping it a trait lets the token lifecycle be tested against
//! an in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::store::StoreError;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the stored password hash, or `None` if the user does not exist.
    async fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError>;

    /// Read the revocation marker, or `None` if the user does not exist.
    async fn is_revoked(&self, username: &str) -> Result<Option<bool>, StoreError>;

    /// Write the revocation marker. Returns `false` when the user is absent.
    async fn set_revoked(&self, username: &str, revoked: bool) -> Result<bool, StoreError>;
}

#[async_trait]
impl CredentialStore for PgPool {
    async fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self)
        .await?;
        Ok(row)
    }

    async fn is_revoked(&self, username: &str) -> Result<Option<bool>, StoreError> {
        let row = sqlx::query_scalar::<_, bool>("SELECT revoked FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self)
            .await?;
        Ok(row)
    }

    async fn set_revoked(&self, username: &str, revoked: bool) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET revoked = $1 WHERE username = $2")
            .bind(revoked)
            .bind(username)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
