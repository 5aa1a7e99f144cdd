//! Authentication primitives.
//!
//! Provides password hashing and the JWT session issuer shared by every
//! login flow in `qdesk_api`.

pub mod jwt;
pub mod password;

use thiserror::Error;

pub use jwt::{SessionClaims, SessionConfig, SessionIssuer};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session token has expired")]
    TokenExpired,

    #[error("Invalid session token: {0}")]
    TokenInvalid(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
