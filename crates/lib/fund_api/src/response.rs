//! Response envelope and pagination cursor.
//!
//! Every response follows the Google JSON style guide: success payloads are
//! wrapped in `{"data": ...}` (plus `nextLink` on pages), failures in
//! `{"error": {"code": ..., "message": ...}}`.

use axum::Json;
use axum::http::Uri;
use serde::Serialize;
use url::form_urlencoded;

use fund_core::store::filter::Page;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "nextLink", skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
    pub data: T,
}

/// Error envelope body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: u16, message: String) -> Self {
        Self {
            error: ErrorDetail { code, message },
        }
    }
}

/// Payload of the sum endpoints.
#[derive(Debug, Serialize)]
pub struct SumResponse {
    pub sum: i64,
}

/// Wrap a payload in the success envelope.
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        next_link: None,
        data,
    })
}

/// Wrap a page of rows, emitting `nextLink` when there may be more results.
pub fn page<T: Serialize>(uri: &Uri, window: Page, rows: Vec<T>) -> Json<Envelope<Vec<T>>> {
    let next_link = next_link(uri, window, rows.len());
    Json(Envelope {
        next_link,
        data: rows,
    })
}

/// Compute the next-page link.
///
/// A full page (`returned == count`) signals "there may be more"; the link
/// reuses the original query with `offset` advanced by `count`. This is a
/// heuristic: a result set whose size is an exact multiple of `count` emits
/// one extra, empty page.
pub fn next_link(uri: &Uri, window: Page, returned: usize) -> Option<String> {
    if returned as i64 != window.count {
        return None;
    }

    let mut pairs: Vec<(String, String)> = uri
        .query()
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .filter(|(key, _)| key != "offset" && key != "count")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default();
    pairs.push(("offset".into(), (window.offset + window.count).to_string()));
    pairs.push(("count".into(), window.count.to_string()));

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    Some(format!("{}?{}", uri.path(), query))
}
