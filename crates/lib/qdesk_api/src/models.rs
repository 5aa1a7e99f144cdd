//! Request and response bodies for the HTTP API.
//!
//! Request fields are `Option`s so that a missing field surfaces as a
//! `validation_error` naming it, not as a JSON decode failure.

use qdesk_core::models::{CitizenPatch, DepartmentInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Success envelope: `{success: true, message?, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Error envelope: `{success: false, error, message}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// Body of `GET /api`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub version: String,
}

/// A signed session plus the principal it was issued to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse<U> {
    pub token: String,
    pub token_type: &'static str,
    /// Session lifetime in seconds.
    pub expires_in: i64,
    pub user: U,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetIdRequest {
    #[serde(alias = "cnic")]
    pub national_id: Option<String>,
}

/// Citizen login: the (id, national ID) pair.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenLoginRequest {
    #[serde(alias = "userId")]
    pub id: Option<String>,
    #[serde(alias = "cnic")]
    pub national_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `POST /users/update-profile` and `POST /users/admin/manage-user`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageUserRequest {
    pub action: Option<String>,
    pub user_id: Option<Uuid>,
    pub data: Option<CitizenPatch>,
}

/// Role change for a citizen (`userId`) or an account (`accountId`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[serde(alias = "accountId")]
    pub user_id: Option<Uuid>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageDepartmentRequest {
    pub action: Option<String>,
    pub department_id: Option<Uuid>,
    pub data: Option<DepartmentInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenRequest {
    /// Citizen ID. A citizen session may omit it to issue for itself.
    pub beneficiary: Option<Uuid>,
    pub department: Option<Uuid>,
    pub purpose: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub token_id: Option<Uuid>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}
