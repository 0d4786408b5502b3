// rest_api/src/services/nurse_requests.rs
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use lib::storage_engine::NurseRequestStorageEngine;
use models::errors::{StaffError, StaffResult};
use models::{NewNurseRequest, NurseRequest};

pub const NURSE_REQUEST_NOT_FOUND: &str = "Nurse request not found";

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

pub async fn list(store: &dyn NurseRequestStorageEngine) -> StaffResult<Vec<NurseRequest>> {
    store.list().await
}

pub async fn create(store: &dyn NurseRequestStorageEngine, input: NewNurseRequest) -> StaffResult<NurseRequest> {
    let request = NurseRequest::from_new(input)?;
    store.create(&request).await?;
    info!(id = %request.id, doctor_id = %request.doctor_id, "Nurse request created");
    Ok(request)
}

/// Ids that are not UUIDs are reported as unknown.
pub async fn update_status(
    store: &dyn NurseRequestStorageEngine,
    id: &str,
    update: UpdateStatusRequest,
) -> StaffResult<NurseRequest> {
    let id = Uuid::parse_str(id.trim()).map_err(|_| StaffError::not_found(NURSE_REQUEST_NOT_FOUND))?;
    store
        .update_status(&id, update.status.as_deref())
        .await?
        .ok_or_else(|| StaffError::not_found(NURSE_REQUEST_NOT_FOUND))
}
