//! List-endpoint query parameter parsing.
//!
//! Filters are parsed by hand rather than through a derived extractor so a
//! bad value produces a `parameter '<name>' must be ...` message in the
//! standard error envelope. An absent parameter is `None`, never conflated
//! with zero.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use fund_core::store::filter::{Page, PaymentFilter, RangeFilter};

use crate::error::AppError;

/// Default page size when `count` is not supplied.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

fn time_param(
    query: &HashMap<String, String>,
    name: &str,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match query.get(name) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| {
                AppError::Validation(format!(
                    "parameter '{name}' must be a time formatted in RFC 3339"
                ))
            }),
    }
}

fn int_param(query: &HashMap<String, String>, name: &str) -> Result<Option<i64>, AppError> {
    match query.get(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("parameter '{name}' must be an integer"))),
    }
}

/// Parse the range bounds shared by deposit and payment endpoints.
pub fn range_filter(query: &HashMap<String, String>) -> Result<RangeFilter, AppError> {
    Ok(RangeFilter {
        oldest: time_param(query, "oldest")?,
        newest: time_param(query, "newest")?,
        min_amount: int_param(query, "minamount")?,
        max_amount: int_param(query, "maxamount")?,
    })
}

/// Parse payment filters: the shared range bounds plus the url substring.
pub fn payment_filter(query: &HashMap<String, String>) -> Result<PaymentFilter, AppError> {
    Ok(PaymentFilter {
        range: range_filter(query)?,
        url: query.get("url").filter(|v| !v.is_empty()).cloned(),
    })
}

/// Parse the pagination window, applying the default page size.
pub fn page(query: &HashMap<String, String>) -> Result<Page, AppError> {
    let count = match int_param(query, "count")? {
        None => DEFAULT_PAGE_SIZE,
        Some(count) if count > 0 => count,
        Some(_) => {
            return Err(AppError::Validation(
                "parameter 'count' must be a positive integer".into(),
            ));
        }
    };
    let offset = match int_param(query, "offset")? {
        None => 0,
        Some(offset) if offset >= 0 => offset,
        Some(_) => {
            return Err(AppError::Validation(
                "parameter 'offset' must be a non-negative integer".into(),
            ));
        }
    };
    Ok(Page { offset, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn absent_filters_parse_to_none() {
        let filter = range_filter(&query(&[])).unwrap();
        assert!(filter.oldest.is_none());
        assert!(filter.newest.is_none());
        assert!(filter.min_amount.is_none());
        assert!(filter.max_amount.is_none());
    }

    #[test]
    fn explicit_zero_is_not_absent() {
        let filter = range_filter(&query(&[("minamount", "0")])).unwrap();
        assert_eq!(filter.min_amount, Some(0));
    }

    #[test]
    fn bad_time_names_the_parameter() {
        let err = range_filter(&query(&[("oldest", "yesterday")])).unwrap_err();
        assert!(
            err.to_string()
                .contains("parameter 'oldest' must be a time formatted in RFC 3339")
        );
    }

    #[test]
    fn valid_times_parse_as_utc() {
        let filter =
            range_filter(&query(&[("newest", "2024-06-01T12:00:00+02:00")])).unwrap();
        assert_eq!(
            filter.newest.unwrap().to_rfc3339(),
            "2024-06-01T10:00:00+00:00"
        );
    }

    #[test]
    fn bad_amount_names_the_parameter() {
        let err = range_filter(&query(&[("maxamount", "lots")])).unwrap_err();
        assert!(
            err.to_string()
                .contains("parameter 'maxamount' must be an integer")
        );
    }

    #[test]
    fn page_defaults() {
        let page = page(&query(&[])).unwrap();
        assert_eq!(page.count, DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn page_rejects_non_positive_count_and_negative_offset() {
        assert!(page(&query(&[("count", "0")])).is_err());
        assert!(page(&query(&[("count", "-5")])).is_err());
        assert!(page(&query(&[("offset", "-1")])).is_err());
    }

    #[test]
    fn empty_url_filter_is_ignored() {
        let filter = payment_filter(&query(&[("url", "")])).unwrap();
        assert!(filter.url.is_none());
        let filter = payment_filter(&query(&[("url", "shop")])).unwrap();
        assert_eq!(filter.url.as_deref(), Some("shop"));
    }
}
