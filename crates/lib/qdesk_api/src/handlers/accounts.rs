//! Account (email + password) handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use qdesk_core::models::AccountProfile;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AccountLoginRequest, ApiResponse, SessionResponse, SignupRequest, UpdateRoleRequest,
};
use crate::services::{auth, users};

/// `POST /api/accounts/signup`
pub async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SessionResponse<AccountProfile>>>)> {
    let session = auth::signup_account(&state.stores, &state.sessions, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Account created", session)),
    ))
}

/// `POST /api/accounts/login`
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AccountLoginRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse<AccountProfile>>>> {
    let session =
        auth::login_account(&state.stores, &state.sessions, body.email, body.password).await?;
    Ok(Json(ApiResponse::with_message("Login successful", session)))
}

/// `GET /api/accounts/profile`
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<AccountProfile>>> {
    let profile = auth::account_profile(&state.stores, claims.kind, claims.sub).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// `PATCH /api/accounts/update-role`: admin only.
pub async fn update_role_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<AccountProfile>>> {
    let account = users::set_account_role(&state.stores, body.user_id, body.role).await?;
    Ok(Json(ApiResponse::with_message("Role updated", account)))
}
