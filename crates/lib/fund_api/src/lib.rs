//! # fund_api
//!
//! HTTP API library for fund.
//!
//! The router composes an explicit guard chain at registration time:
//! CSRF guard (mutating methods only) → auth guard (protected routes,
//! parameterized by required token type) → handler.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod params;
pub mod response;

use axum::Router;
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{auth, deposits, health, payments, users};
use crate::middleware::csrf::AllowedOrigins;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `fund_core::migrate::migrate()` which owns the migration
/// files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    fund_core::migrate::migrate(pool).await
}

/// Builds the axum router with all routes, guards, and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let allowed = AllowedOrigins::new(state.config.allowed_origins.clone());

    // Public routes (no token required)
    let public = Router::new()
        .route("/health", get(health))
        .route("/users", post(users::post_user))
        .route("/users/exists", get(users::get_user_exists))
        .route("/users/{username}/authorize", get(auth::authorize));

    // The token-exchange route requires a refresh token
    let refresh = Router::new()
        .route("/users/{username}/token", get(auth::get_access_token))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_refresh,
        ));

    // Everything else requires an access token
    let access = Router::new()
        .route(
            "/users/{username}",
            get(users::get_user)
                .put(users::put_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/{username}/token",
            axum::routing::delete(auth::revoke_tokens),
        )
        .route(
            "/users/{username}/deposit",
            post(deposits::post_deposit).get(deposits::get_deposit),
        )
        .route("/users/{username}/deposits", get(deposits::list_deposits))
        .route(
            "/users/{username}/deposits/sum",
            get(deposits::sum_deposits),
        )
        .route(
            "/users/{username}/payment",
            post(payments::post_payment).get(payments::get_payment),
        )
        .route("/users/{username}/payments", get(payments::list_payments))
        .route(
            "/users/{username}/payments/sum",
            get(payments::sum_payments),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_access,
        ));

    let api = Router::new()
        .merge(public)
        .merge(refresh)
        .merge(access)
        // The CSRF guard wraps the whole API and runs before the auth
        // guards; it ignores safe methods.
        .layer(axum::middleware::from_fn_with_state(
            allowed,
            middleware::csrf::require_trusted_origin,
        ))
        .layer(cors);

    Router::new().nest("/v1", api).with_state(state)
}
