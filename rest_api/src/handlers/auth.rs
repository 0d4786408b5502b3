// rest_api/src/handlers/auth.rs
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{respond, ApiResponse, ApiResult};
use crate::services::authentication::{self, ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::AppState;

// Handler for POST /api/auth/login
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let response = authentication::login(&state, request).await?;
    respond(StatusCode::OK, "Login successful", response)
}

// Handler for PUT /api/staff/:staffId/password
pub async fn change_password_handler(
    State(state): State<AppState>,
    Path(staff_id): Path<String>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(request) = payload?;
    authentication::change_password(&state, &staff_id, request).await?;
    Ok((StatusCode::OK, Json(ApiResponse::message("Password updated successfully"))))
}
