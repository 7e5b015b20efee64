//! Auth guard: Bearer token extraction and validation.
//!
//! A pure gate: it validates the token against the required type and binds
//! the authenticated subject into request extensions, never touching the
//! wrapped handler's business logic. Handlers assert resource ownership with
//! [`AuthenticatedUser::require_owner`].

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use fund_core::auth::service;
use fund_core::auth::token::TokenType;

use crate::AppState;
use crate::error::AppError;

/// The validated token subject, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl AuthenticatedUser {
    /// Fail with 403 unless the token subject owns the addressed resource.
    pub fn require_owner(&self, username: &str) -> Result<(), AppError> {
        if self.username != username {
            return Err(AppError::Forbidden(
                "Token does not authorize access to this user".into(),
            ));
        }
        Ok(())
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Invalid authorization scheme".into()))
}

/// Guard requiring a valid access token.
pub async fn require_access(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require(state, request, next, TokenType::Access).await
}

/// Guard requiring a valid refresh token.
pub async fn require_refresh(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require(state, request, next, TokenType::Refresh).await
}

async fn require(
    state: AppState,
    mut request: Request,
    next: Next,
    required: TokenType,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let username = service::validate(
        &state.pool,
        token,
        required,
        state.config.jwt_secret.as_bytes(),
    )
    .await?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { username });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn ownership_check() {
        let user = AuthenticatedUser {
            username: "alice".into(),
        };
        assert!(user.require_owner("alice").is_ok());
        assert!(matches!(
            user.require_owner("bob").unwrap_err(),
            AppError::Forbidden(_)
        ));
    }
}
