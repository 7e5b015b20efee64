//! Payment queries.
//!
//! The debit is a conditional decrement inside the insert transaction:
//! `balance >= amount` is checked and applied in a single statement, so two
//! concurrent payments can never both pass the check and overdraw.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::StoreError;
use super::filter::{Page, PaymentFilter, SqlFilter, push_page};
use crate::models::Payment;

const COLUMNS: &str = "id, username, amount, time, url";

fn payment_filter(username: &str, filter: &PaymentFilter) -> SqlFilter {
    let mut sql_filter = SqlFilter::owned_by(username);
    filter.apply(&mut sql_filter);
    sql_filter
}

/// Record a payment and debit the user's balance in one transaction.
///
/// Fails with `InsufficientFunds` when the balance cannot cover the amount,
/// and `NotFound` when the user is absent.
pub async fn create_payment(pool: &PgPool, payment: &Payment) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    let debited = sqlx::query(
        "UPDATE users SET balance = balance - $1 WHERE username = $2 AND balance >= $1",
    )
    .bind(payment.amount)
    .bind(&payment.username)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if debited == 0 {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(&payment.username)
                .fetch_one(&mut *tx)
                .await?;
        return Err(if exists {
            StoreError::InsufficientFunds
        } else {
            StoreError::NotFound("user")
        });
    }

    sqlx::query(
        "INSERT INTO payments (id, username, amount, time, url) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(payment.id)
    .bind(&payment.username)
    .bind(payment.amount)
    .bind(payment.time)
    .bind(&payment.url)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(username = %payment.username, amount = payment.amount, "recorded payment");
    Ok(())
}

/// Fetch a single payment owned by the user.
pub async fn get_payment(
    pool: &PgPool,
    username: &str,
    id: Uuid,
) -> Result<Option<Payment>, StoreError> {
    let row = sqlx::query_as::<_, Payment>(
        "SELECT id, username, amount, time, url FROM payments WHERE id = $1 AND username = $2",
    )
    .bind(id)
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List a page of the user's payments matching the filter, oldest first.
pub async fn list_payments(
    pool: &PgPool,
    username: &str,
    filter: &PaymentFilter,
    page: Page,
) -> Result<Vec<Payment>, StoreError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM payments"));
    payment_filter(username, filter).apply(&mut qb);
    qb.push(" ORDER BY time, id");
    push_page(&mut qb, page);

    let rows = qb.build_query_as::<Payment>().fetch_all(pool).await?;
    Ok(rows)
}

/// Sum the user's payments matching the filter.
pub async fn sum_payments(
    pool: &PgPool,
    username: &str,
    filter: &PaymentFilter,
) -> Result<i64, StoreError> {
    // SUM(BIGINT) is NUMERIC in Postgres; cast back for the i64 decode.
    let mut qb =
        QueryBuilder::<Postgres>::new("SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments");
    payment_filter(username, filter).apply(&mut qb);

    let sum = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::users;

    /// Connect to the database under test, or skip when none is configured.
    async fn test_pool() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
        crate::migrate::migrate(&pool).await.expect("run migrations");
        Some(pool)
    }

    fn payment(username: &str, amount: i64) -> Payment {
        Payment {
            id: Uuid::now_v7(),
            username: username.to_string(),
            amount,
            time: Utc::now(),
            url: "https://shop.example".into(),
        }
    }

    #[tokio::test]
    async fn racing_payments_cannot_overdraw() {
        let Some(pool) = test_pool().await else {
            return;
        };

        let username = format!("overdraw-{}", Uuid::now_v7());
        users::create_user(&pool, &username, "unused-hash", "overdraw@example.com")
            .await
            .unwrap();
        sqlx::query("UPDATE users SET balance = 100 WHERE username = $1")
            .bind(&username)
            .execute(&pool)
            .await
            .unwrap();

        // Two 80-cent payments against a balance of 100: the row lock on the
        // conditional debit serializes them, so exactly one may pass.
        let first = payment(&username, 80);
        let second = payment(&username, 80);
        let results = tokio::join!(
            create_payment(&pool, &first),
            create_payment(&pool, &second),
        );
        let results = [results.0, results.1];

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::InsufficientFunds)))
            .count();
        assert_eq!(succeeded, 1);
        assert_eq!(refused, 1);

        let balance =
            sqlx::query_scalar::<_, i64>("SELECT balance FROM users WHERE username = $1")
                .bind(&username)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(balance, 20);

        let recorded = sum_payments(&pool, &username, &PaymentFilter::default())
            .await
            .unwrap();
        assert_eq!(recorded, 80);

        users::delete_user(&pool, &username).await.unwrap();
    }

    #[tokio::test]
    async fn payment_for_unknown_user_is_not_found() {
        let Some(pool) = test_pool().await else {
            return;
        };

        let username = format!("ghost-{}", Uuid::now_v7());
        let err = create_payment(&pool, &payment(&username, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("user")));
    }
}
