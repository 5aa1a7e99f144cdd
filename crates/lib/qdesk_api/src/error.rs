//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qdesk_core::auth::AuthError;
use qdesk_core::lifecycle::LifecycleError;
use qdesk_core::store::StoreError;
use qdesk_core::validation::ValidationError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::DuplicateIdentity(m) => {
                (StatusCode::BAD_REQUEST, "duplicate_identity", m.as_str())
            }
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::InvalidTransition(m) => {
                (StatusCode::CONFLICT, "invalid_transition", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            success: false,
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate("nationalId") => {
                AppError::DuplicateIdentity("User with this CNIC already exists.".into())
            }
            StoreError::Duplicate("email") => {
                AppError::DuplicateIdentity("Email already in use".into())
            }
            StoreError::Duplicate(field) => {
                AppError::DuplicateIdentity(format!("Duplicate value for {field}"))
            }
            StoreError::Corrupt(_) | StoreError::Database(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::TokenExpired => AppError::Unauthorized("Session token has expired".into()),
            AuthError::TokenInvalid(_) => AppError::Unauthorized("Invalid session token".into()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::InvalidTransition { .. } | LifecycleError::Contended(_) => {
                AppError::InvalidTransition(e.to_string())
            }
            LifecycleError::NumbersExhausted(_) => AppError::Internal(e.to_string()),
            LifecycleError::Store(e) => AppError::from(e),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.0)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
