// rest_api/src/handlers/nurse_requests.rs
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use models::{NewNurseRequest, NurseRequest};

use crate::error::{respond, ApiResult};
use crate::services::nurse_requests::{self, UpdateStatusRequest};
use crate::AppState;

pub async fn list_nurse_requests_handler(State(state): State<AppState>) -> ApiResult<Vec<NurseRequest>> {
    let requests = nurse_requests::list(state.nurse_requests.as_ref()).await?;
    respond(StatusCode::OK, "Nurse requests retrieved successfully", requests)
}

pub async fn create_nurse_request_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewNurseRequest>, JsonRejection>,
) -> ApiResult<NurseRequest> {
    let Json(input) = payload?;
    let request = nurse_requests::create(state.nurse_requests.as_ref(), input).await?;
    respond(StatusCode::CREATED, "Nurse request created successfully", request)
}

pub async fn update_nurse_request_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<NurseRequest> {
    let Json(update) = payload?;
    let request = nurse_requests::update_status(state.nurse_requests.as_ref(), &id, update).await?;
    respond(StatusCode::OK, "Nurse request updated successfully", request)
}
