// rest_api/src/handlers/staff.rs
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};

use models::{DoctorSummary, RoleCount, StaffProfile};

use crate::error::{respond, ApiResponse, ApiResult};
use crate::services::directory;
use crate::services::intake::{self, STAFF_ADDED};
use crate::AppState;

// Handler for POST /api/staff/add
pub async fn add_staff_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<StaffProfile> {
    let mut multipart = multipart?;
    let (registration, batch) = intake::read_registration_form(&mut multipart, &state.files).await?;
    let profile = intake::register_staff(&state, registration, batch).await?;
    respond(StatusCode::CREATED, STAFF_ADDED, profile)
}

pub async fn list_staff_handler(State(state): State<AppState>) -> ApiResult<Vec<StaffProfile>> {
    let staff = directory::list_staff(state.staff.as_ref()).await?;
    respond(StatusCode::OK, "Staff retrieved successfully", staff)
}

pub async fn get_staff_by_email_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<StaffProfile> {
    let profile = directory::get_by_email(state.staff.as_ref(), &email).await?;
    respond(StatusCode::OK, "Staff retrieved successfully", profile)
}

pub async fn list_doctors_handler(State(state): State<AppState>) -> ApiResult<Vec<StaffProfile>> {
    let doctors = directory::list_doctors(state.staff.as_ref()).await?;
    respond(StatusCode::OK, "Doctors retrieved successfully", doctors)
}

pub async fn list_doctor_essentials_handler(State(state): State<AppState>) -> ApiResult<Vec<DoctorSummary>> {
    let doctors = directory::list_doctor_essentials(state.staff.as_ref()).await?;
    respond(StatusCode::OK, "Doctors retrieved successfully", doctors)
}

pub async fn list_doctors_by_specialization_handler(
    State(state): State<AppState>,
    Path(specialization): Path<String>,
) -> ApiResult<Vec<StaffProfile>> {
    let doctors = directory::list_doctors_by_specialization(state.staff.as_ref(), &specialization).await?;
    respond(StatusCode::OK, "Doctors retrieved successfully", doctors)
}

pub async fn role_counts_handler(State(state): State<AppState>) -> ApiResult<Vec<RoleCount>> {
    let counts = directory::role_counts(state.staff.as_ref()).await?;
    respond(StatusCode::OK, "Role counts retrieved successfully", counts)
}

// Handler for DELETE /api/staff/:staffId
pub async fn delete_staff_handler(State(state): State<AppState>, Path(staff_id): Path<String>) -> ApiResult<()> {
    let full_name = directory::delete_staff(&state, &staff_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::message(format!("Staff {} deleted successfully", full_name)))))
}
