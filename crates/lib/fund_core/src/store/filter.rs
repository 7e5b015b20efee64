//! Filter query builder.
//!
//! List and sum queries take optional range/equality filters. Every filter
//! value reaches the query as a bound parameter via
//! [`sqlx::QueryBuilder::push_bind`]; the only strings pushed into the SQL
//! text are column names and operators fixed at the call site.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

/// Optional bounds shared by deposit and payment queries. `None` means
/// "no constraint"; an explicit zero is a real bound.
#[derive(Debug, Clone, Default)]
pub struct RangeFilter {
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
}

/// Payment queries additionally support a substring match on the url field.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub range: RangeFilter,
    pub url: Option<String>,
}

/// Resolved pagination window. Validated non-negative before construction;
/// both values are bound parameters, never interpolated.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: i64,
    pub count: i64,
}

#[derive(Debug, Clone)]
enum Bound {
    Int(i64),
    Time(DateTime<Utc>),
    Text(String),
}

#[derive(Debug, Clone)]
struct Predicate {
    column: &'static str,
    op: &'static str,
    value: Bound,
}

/// An ordered, conjunctive set of filter predicates.
#[derive(Debug, Clone, Default)]
pub struct SqlFilter {
    predicates: Vec<Predicate>,
}

impl SqlFilter {
    /// Start a filter with the mandatory resource-owner equality predicate.
    pub fn owned_by(username: &str) -> Self {
        let mut filter = Self::default();
        filter.push("username", "=", Bound::Text(username.to_string()));
        filter
    }

    fn push(&mut self, column: &'static str, op: &'static str, value: Bound) {
        self.predicates.push(Predicate { column, op, value });
    }

    pub fn ge_time(&mut self, column: &'static str, value: DateTime<Utc>) {
        self.push(column, ">=", Bound::Time(value));
    }

    pub fn le_time(&mut self, column: &'static str, value: DateTime<Utc>) {
        self.push(column, "<=", Bound::Time(value));
    }

    pub fn ge_int(&mut self, column: &'static str, value: i64) {
        self.push(column, ">=", Bound::Int(value));
    }

    pub fn le_int(&mut self, column: &'static str, value: i64) {
        self.push(column, "<=", Bound::Int(value));
    }

    /// Substring match. The wildcards are wrapped into the bound value, not
    /// the SQL text.
    pub fn contains(&mut self, column: &'static str, value: &str) {
        self.push(column, "LIKE", Bound::Text(format!("%{value}%")));
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append `WHERE a op $1 AND b op $2 ...` to the query.
    pub fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, p) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            qb.push(p.column);
            qb.push(" ");
            qb.push(p.op);
            qb.push(" ");
            match &p.value {
                Bound::Int(v) => qb.push_bind(*v),
                Bound::Time(v) => qb.push_bind(*v),
                Bound::Text(v) => qb.push_bind(v.clone()),
            };
        }
    }
}

impl RangeFilter {
    /// Contribute one predicate per explicitly-set bound.
    pub fn apply(&self, filter: &mut SqlFilter) {
        if let Some(oldest) = self.oldest {
            filter.ge_time("time", oldest);
        }
        if let Some(newest) = self.newest {
            filter.le_time("time", newest);
        }
        if let Some(max) = self.max_amount {
            filter.le_int("amount", max);
        }
        if let Some(min) = self.min_amount {
            filter.ge_int("amount", min);
        }
    }
}

impl PaymentFilter {
    pub fn apply(&self, filter: &mut SqlFilter) {
        self.range.apply(filter);
        if let Some(url) = &self.url {
            filter.contains("url", url);
        }
    }
}

/// Append bound `LIMIT`/`OFFSET` clauses.
pub fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: Page) {
    qb.push(" LIMIT ");
    qb.push_bind(page.count);
    qb.push(" OFFSET ");
    qb.push_bind(page.offset);
}
