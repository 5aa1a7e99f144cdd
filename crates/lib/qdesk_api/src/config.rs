//! API server configuration.

use chrono::Duration;
use qdesk_core::auth::SessionConfig;
use qdesk_core::auth::jwt::{DEFAULT_SESSION_TTL_SECS, parse_ttl, resolve_jwt_secret};
use tracing::warn;

/// Configuration for the API server. Built once at startup and never mutated.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Session signing secret and lifetime.
    pub session: SessionConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable         | Default                                  |
    /// |------------------|------------------------------------------|
    /// | `BIND_ADDR`      | `127.0.0.1:5000`                         |
    /// | `DATABASE_URL`   | `postgres://localhost:5432/qdesk`        |
    /// | `JWT_SECRET`     | generated & persisted to file            |
    /// | `JWT_EXPIRES_IN` | `1d` (seconds, or `30s`/`15m`/`12h`/`1d`) |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/qdesk".into()),
            session: SessionConfig::new(resolve_jwt_secret()).with_ttl(session_ttl_from_env()),
        }
    }

    /// Configuration for tests and embedding: fixed secret, default ttl.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            database_url: String::new(),
            session: SessionConfig::new(secret),
        }
    }
}

fn session_ttl_from_env() -> Duration {
    let default = Duration::seconds(DEFAULT_SESSION_TTL_SECS);
    match std::env::var("JWT_EXPIRES_IN") {
        Ok(raw) => parse_ttl(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "unparseable JWT_EXPIRES_IN, using default session ttl");
            default
        }),
        Err(_) => default,
    }
}
