//! Department handlers.

use axum::Json;
use axum::extract::State;
use qdesk_core::models::Department;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::models::{ApiResponse, ManageDepartmentRequest};
use crate::services::departments;

/// `POST /api/departments/manage`: admin only.
pub async fn manage_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ManageDepartmentRequest>,
) -> AppResult<Json<ApiResponse<Department>>> {
    let managed =
        departments::manage(&state.stores, body.action, body.department_id, body.data).await?;
    Ok(Json(ApiResponse::with_message(
        managed.message,
        managed.department,
    )))
}

/// `GET /api/departments`
pub async fn list_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Department>>>> {
    let all = departments::list(&state.stores).await?;
    Ok(Json(ApiResponse::ok(all)))
}
