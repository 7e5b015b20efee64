//! Deposit queries.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::StoreError;
use super::filter::{Page, RangeFilter, SqlFilter, push_page};
use crate::models::Deposit;

const COLUMNS: &str = "id, username, amount, time";

fn deposit_filter(username: &str, range: &RangeFilter) -> SqlFilter {
    let mut filter = SqlFilter::owned_by(username);
    range.apply(&mut filter);
    filter
}

/// Record a deposit and credit the user's balance in one transaction.
pub async fn create_deposit(pool: &PgPool, deposit: &Deposit) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    let credited = sqlx::query("UPDATE users SET balance = balance + $1 WHERE username = $2")
        .bind(deposit.amount)
        .bind(&deposit.username)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if credited == 0 {
        return Err(StoreError::NotFound("user"));
    }

    sqlx::query("INSERT INTO deposits (id, username, amount, time) VALUES ($1, $2, $3, $4)")
        .bind(deposit.id)
        .bind(&deposit.username)
        .bind(deposit.amount)
        .bind(deposit.time)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(username = %deposit.username, amount = deposit.amount, "recorded deposit");
    Ok(())
}

/// Fetch a single deposit owned by the user.
pub async fn get_deposit(
    pool: &PgPool,
    username: &str,
    id: Uuid,
) -> Result<Option<Deposit>, StoreError> {
    let row = sqlx::query_as::<_, Deposit>(
        "SELECT id, username, amount, time FROM deposits WHERE id = $1 AND username = $2",
    )
    .bind(id)
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List a page of the user's deposits matching the filter, oldest first.
pub async fn list_deposits(
    pool: &PgPool,
    username: &str,
    range: &RangeFilter,
    page: Page,
) -> Result<Vec<Deposit>, StoreError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM deposits"));
    deposit_filter(username, range).apply(&mut qb);
    qb.push(" ORDER BY time, id");
    push_page(&mut qb, page);

    let rows = qb.build_query_as::<Deposit>().fetch_all(pool).await?;
    Ok(rows)
}

/// Sum the user's deposits matching the filter.
pub async fn sum_deposits(
    pool: &PgPool,
    username: &str,
    range: &RangeFilter,
) -> Result<i64, StoreError> {
    // SUM(BIGINT) is NUMERIC in Postgres; cast back for the i64 decode.
    let mut qb =
        QueryBuilder::<Postgres>::new("SELECT COALESCE(SUM(amount), 0)::BIGINT FROM deposits");
    deposit_filter(username, range).apply(&mut qb);

    let sum = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(sum)
}
