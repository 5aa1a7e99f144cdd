//! Authentication and role-gating middleware.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use qdesk_core::auth::{AuthError, SessionClaims};
use qdesk_core::models::Role;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::AppError;

/// Key used to store `SessionClaims` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionClaims);

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the JWT,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;

    let claims = state.sessions.verify(token.trim()).inspect_err(|e| match e {
        AuthError::TokenExpired => debug!("rejected expired session token"),
        other => warn!(error = %other, "rejected session token"),
    })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}

/// The roles a route admits. Declared once, at router construction.
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [Role]);

impl AllowedRoles {
    pub const ADMIN: Self = Self(&[Role::Admin]);

    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

/// Axum middleware: refuses with 403 unless the authenticated principal's
/// role is in the route's [`AllowedRoles`]. Must run inside [`require_auth`].
pub async fn require_roles(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let AuthenticatedUser(claims) = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

    if !allowed.permits(claims.role) {
        warn!(sub = %claims.sub, role = %claims.role, path = %request.uri().path(), "role not permitted");
        return Err(AppError::Forbidden(format!(
            "Role '{}' is not allowed to access this resource",
            claims.role
        )));
    }

    Ok(next.run(request).await)
}
