//! Citizen profile and user-management handlers.

use axum::extract::State;
use axum::{Extension, Json};
use qdesk_core::models::Citizen;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, ManageUserRequest, UpdateRoleRequest};
use crate::services::users::{self, Managed};

fn managed_response(managed: Managed) -> Json<ApiResponse<Citizen>> {
    match managed {
        Managed::Updated(c) => Json(ApiResponse::with_message("User updated successfully", c)),
        Managed::Deleted(c) => Json(ApiResponse::with_message("User deleted successfully", c)),
    }
}

/// `GET /api/users/profile`
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Citizen>>> {
    let citizen = users::citizen_profile(&state.stores, &claims).await?;
    Ok(Json(ApiResponse::ok(citizen)))
}

/// `POST /api/users/update-profile`: `action` defaults to `update`.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<ManageUserRequest>,
) -> AppResult<Json<ApiResponse<Citizen>>> {
    let action = body.action.as_deref().unwrap_or("update");
    let managed =
        users::manage_citizen(&state.stores, &claims, action, body.user_id, body.data).await?;
    Ok(managed_response(managed))
}

/// `GET /api/users/admin/users`: admin only.
pub async fn list_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Citizen>>>> {
    let citizens = users::list_citizens(&state.stores).await?;
    Ok(Json(ApiResponse::ok(citizens)))
}

/// `POST /api/users/admin/manage-user`: admin only.
pub async fn manage_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<ManageUserRequest>,
) -> AppResult<Json<ApiResponse<Citizen>>> {
    let action = body
        .action
        .as_deref()
        .ok_or_else(|| AppError::Validation("action is required".into()))?;
    let user_id = body
        .user_id
        .ok_or_else(|| AppError::Validation("userId is required".into()))?;
    let managed =
        users::manage_citizen(&state.stores, &claims, action, Some(user_id), body.data).await?;
    Ok(managed_response(managed))
}

/// `PATCH /api/users/update-role`: admin only.
pub async fn update_role_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<Citizen>>> {
    let citizen = users::set_citizen_role(&state.stores, body.user_id, body.role).await?;
    Ok(Json(ApiResponse::with_message("Role updated", citizen)))
}
