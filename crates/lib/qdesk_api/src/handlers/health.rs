//! Liveness endpoint and the unmatched-route fallback.

use axum::Json;
use axum::http::Uri;
use tracing::debug;

use crate::error::AppError;
use crate::models::HealthResponse;

/// `GET /api`: reports that the API is up.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API is running...".into(),
        version: qdesk_core::version().to_string(),
    })
}

/// Fallback for every path no route matches.
pub async fn not_found(uri: Uri) -> AppError {
    debug!(path = %uri.path(), "no route matched");
    AppError::NotFound("Route not found".into())
}
