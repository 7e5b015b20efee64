//! API server configuration.

use chrono::Duration;
use thiserror::Error;

/// Default refresh token lifetime: 30 days.
const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

/// Default access token lifetime: 15 minutes.
const DEFAULT_ACCESS_TTL_MINS: i64 = 15;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// Process-wide token signing secret. Never derived per user or token.
    pub jwt_secret: String,
    /// Origins trusted by the CSRF guard for mutating requests.
    pub allowed_origins: Vec<String>,
    /// Refresh token lifetime.
    pub refresh_token_ttl: Duration,
    /// Access token lifetime.
    pub access_token_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable JWT_SECRET cannot be empty")]
    MissingJwtSecret,

    #[error("environment variable {0} must be a positive integer")]
    BadInteger(&'static str),
}

/// Parse a TTL value. A zero or negative lifetime would mint tokens that are
/// dead on arrival, so it is a configuration error, not a valid setting.
fn positive_int(
    name: &'static str,
    raw: Option<String>,
    default: i64,
) -> Result<i64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::BadInteger(name)),
        },
    }
}

fn int_var(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    positive_int(name, std::env::var(name).ok(), default)
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                 | Default           |
    /// |--------------------------|-------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:8080`  |
    /// | `JWT_SECRET`             | required          |
    /// | `ALLOWED_ORIGINS`        | empty (comma-separated list) |
    /// | `REFRESH_TOKEN_TTL_DAYS` | `30`              |
    /// | `ACCESS_TOKEN_TTL_MINS`  | `15`              |
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            jwt_secret,
            allowed_origins,
            refresh_token_ttl: Duration::days(int_var(
                "REFRESH_TOKEN_TTL_DAYS",
                DEFAULT_REFRESH_TTL_DAYS,
            )?),
            access_token_ttl: Duration::minutes(int_var(
                "ACCESS_TOKEN_TTL_MINS",
                DEFAULT_ACCESS_TTL_MINS,
            )?),
        })
    }
}
