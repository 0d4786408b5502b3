// rest_api/src/services/directory.rs

//! Read-only staff queries and staff deletion.

use tracing::info;

use lib::storage_engine::StaffStorageEngine;
use models::errors::{StaffError, StaffResult};
use models::util::normalize_email;
use models::{DoctorSummary, Role, RoleCount, StaffProfile};

use crate::AppState;

pub const STAFF_NOT_FOUND: &str = "Staff not found";

pub async fn list_staff(staff: &dyn StaffStorageEngine) -> StaffResult<Vec<StaffProfile>> {
    Ok(staff.list().await?.into_iter().map(StaffProfile::from).collect())
}

/// Case-insensitive lookup by work email.
pub async fn get_by_email(staff: &dyn StaffStorageEngine, email: &str) -> StaffResult<StaffProfile> {
    staff
        .get_by_work_email(&normalize_email(email))
        .await?
        .map(StaffProfile::from)
        .ok_or_else(|| StaffError::not_found(STAFF_NOT_FOUND))
}

pub async fn list_doctors(staff: &dyn StaffStorageEngine) -> StaffResult<Vec<StaffProfile>> {
    Ok(staff.list_by_role(Role::Doctor).await?.into_iter().map(StaffProfile::from).collect())
}

/// Doctors with a specialization containing `needle`, ignoring case.
pub async fn list_doctors_by_specialization(
    staff: &dyn StaffStorageEngine,
    needle: &str,
) -> StaffResult<Vec<StaffProfile>> {
    Ok(staff
        .list_by_role(Role::Doctor)
        .await?
        .into_iter()
        .filter(|record| record.has_specialization_like(needle))
        .map(StaffProfile::from)
        .collect())
}

/// Doctor summaries sorted by name, then staff id.
pub async fn list_doctor_essentials(staff: &dyn StaffStorageEngine) -> StaffResult<Vec<DoctorSummary>> {
    let mut doctors: Vec<DoctorSummary> =
        staff.list_by_role(Role::Doctor).await?.into_iter().map(DoctorSummary::from).collect();
    doctors.sort_by_cached_key(|d| (d.full_name.to_lowercase(), d.staff_id.clone()));
    Ok(doctors)
}

pub async fn role_counts(staff: &dyn StaffStorageEngine) -> StaffResult<Vec<RoleCount>> {
    staff.count_by_role().await
}

/// Removes the record and then its files. Returns the removed staff's name.
pub async fn delete_staff(state: &AppState, staff_id: &str) -> StaffResult<String> {
    let record = state
        .staff
        .delete_by_staff_id(staff_id)
        .await?
        .ok_or_else(|| StaffError::not_found(STAFF_NOT_FOUND))?;
    state.files.delete_all(&record.uploads()).await;
    info!(staff_id = %record.staff_id, "Staff deleted");
    Ok(record.full_name)
}
