//! User CRUD queries.

use sqlx::PgPool;

use super::StoreError;
use crate::models::User;

/// Create a user with a zero balance. Fails with `Conflict` when the
/// username is taken.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    email: &str,
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO users (username, password_hash, email) VALUES ($1, $2, $3)")
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict("user"),
            _ => StoreError::Db(e),
        })?;
    Ok(())
}

/// Fetch a user's public profile.
pub async fn get_user(pool: &PgPool, username: &str) -> Result<Option<User>, StoreError> {
    let row = sqlx::query_as::<_, User>(
        "SELECT username, email, balance FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Check whether a username is taken.
pub async fn user_exists(pool: &PgPool, username: &str) -> Result<bool, StoreError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Update email and/or password hash; absent fields are left untouched.
/// Returns `false` when the user does not exist.
pub async fn update_user(
    pool: &PgPool,
    username: &str,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> Result<bool, StoreError> {
    let result = sqlx::query(
        "UPDATE users SET email = COALESCE($1, email), \
         password_hash = COALESCE($2, password_hash) WHERE username = $3",
    )
    .bind(email)
    .bind(password_hash)
    .bind(username)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a user and, via cascade, their deposits and payments.
/// Returns `false` when the user does not exist.
pub async fn delete_user(pool: &PgPool, username: &str) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
