//! CSRF guard: origin allow-list for state-changing requests.
//!
//! Forged cross-site requests only matter where they can mutate state, so
//! safe methods pass through untouched. For every other method the `Origin`
//! header (or `Referer` as a fallback) must exactly match one of the
//! configured origins, otherwise the request is rejected before any business
//! logic runs.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{ORIGIN, REFERER};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;

/// The configured origin allow-list, shared with the router at
/// registration time.
#[derive(Debug, Clone)]
pub struct AllowedOrigins(pub Arc<Vec<String>>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(Arc::new(origins))
    }

    fn matches(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| self.0.iter().any(|origin| origin == v))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Layered over the whole API; rejects mutating requests from untrusted
/// origins with 403.
pub async fn require_trusted_origin(
    State(allowed): State<AllowedOrigins>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    ) {
        return Ok(next.run(request).await);
    }

    let origin = header_str(request.headers(), ORIGIN);
    let referer = header_str(request.headers(), REFERER);
    if !(allowed.matches(origin) || allowed.matches(referer)) {
        return Err(AppError::Forbidden("Invalid request origin".into()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    async fn ok() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    fn app() -> Router {
        let allowed = AllowedOrigins::new(vec!["https://fund.example".into()]);
        Router::new()
            .route("/things", get(ok).post(ok))
            .layer(axum::middleware::from_fn_with_state(
                allowed,
                require_trusted_origin,
            ))
    }

    fn request(method: &str, origin: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method(method).uri("/things");
        if let Some(origin) = origin {
            builder = builder.header("Origin", origin);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn mutating_request_from_untrusted_origin_is_rejected() {
        let resp = app()
            .oneshot(request("POST", Some("https://evil.example")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], 403);
        assert_eq!(json["error"]["message"], "Invalid request origin");
    }

    #[tokio::test]
    async fn mutating_request_without_origin_is_rejected() {
        let resp = app().oneshot(request("POST", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn mutating_request_from_allowed_origin_passes() {
        let resp = app()
            .oneshot(request("POST", Some("https://fund.example")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn referer_is_accepted_as_fallback() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/things")
            .header("Referer", "https://fund.example")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn read_only_request_bypasses_the_check() {
        let resp = app()
            .oneshot(request("GET", Some("https://evil.example")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
