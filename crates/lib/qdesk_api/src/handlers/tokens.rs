//! Service token handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use qdesk_core::models::ServiceTokenView;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, GenerateTokenRequest, UpdateStatusRequest};
use crate::services::tokens;

/// `POST /api/tokens/generate`
pub async fn generate_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<GenerateTokenRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ServiceTokenView>>)> {
    let token = tokens::generate(&state.stores, &claims, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Token generated successfully.",
            token,
        )),
    ))
}

/// `GET /api/tokens/token/{token_number}`
pub async fn get_by_number_handler(
    State(state): State<AppState>,
    Path(token_number): Path<String>,
) -> AppResult<Json<ApiResponse<ServiceTokenView>>> {
    let token = tokens::get_by_number(&state.stores, &token_number).await?;
    Ok(Json(ApiResponse::ok(token)))
}

/// `GET /api/tokens/{token_id}`
pub async fn get_by_id_handler(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> AppResult<Json<ApiResponse<ServiceTokenView>>> {
    let token = tokens::get_by_id(&state.stores, &token_id).await?;
    Ok(Json(ApiResponse::ok(token)))
}

/// `POST /api/tokens/update-status`
pub async fn update_status_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<ServiceTokenView>>> {
    let token = tokens::update_status(&state.stores, &claims, body).await?;
    Ok(Json(ApiResponse::with_message(
        "Token status updated successfully.",
        token,
    )))
}

/// `GET /api/tokens`
pub async fn list_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ServiceTokenView>>>> {
    let all = tokens::list(&state.stores).await?;
    Ok(Json(ApiResponse::ok(all)))
}
