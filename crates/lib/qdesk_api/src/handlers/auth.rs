//! Citizen registration and login handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use qdesk_core::models::{CitizenSummary, RegisterCitizen};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::models::{ApiResponse, CitizenLoginRequest, GetIdRequest, SessionResponse};
use crate::services::auth;

/// `POST /api/auth/register`: register a citizen.
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterCitizen>,
) -> AppResult<(StatusCode, Json<ApiResponse<CitizenSummary>>)> {
    let citizen = auth::register_citizen(&state.stores, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully.",
            citizen,
        )),
    ))
}

/// `POST /api/auth/get-id`: find a citizen's ID from their national ID.
pub async fn get_id_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GetIdRequest>,
) -> AppResult<Json<ApiResponse<CitizenSummary>>> {
    let citizen = auth::find_citizen_id(&state.stores, body.national_id).await?;
    Ok(Json(ApiResponse::ok(citizen)))
}

/// `POST /api/auth/login`: sign in with ID and national ID.
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CitizenLoginRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse<CitizenSummary>>>> {
    let session =
        auth::login_citizen(&state.stores, &state.sessions, body.id, body.national_id).await?;
    Ok(Json(ApiResponse::with_message("Login successful", session)))
}
