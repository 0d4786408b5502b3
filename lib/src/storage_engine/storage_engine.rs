// lib/src/storage_engine/storage_engine.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

use models::errors::StaffResult;
use models::{NurseRequest, Role, RoleCount, StaffRecord};

/// Conflict message shared by every engine.
pub const STAFF_CONFLICT: &str = "Staff ID or email already exists";

/// The credential store: staff identity, authentication and profile records.
///
/// `staff_id`, `work_email` and `personal_email` are each unique across all
/// records. Emails are expected in their normalized (trimmed, lower-case)
/// form; engines compare them byte for byte.
#[async_trait]
pub trait StaffStorageEngine: Send + Sync + 'static {
    /// Inserts `record` unless one of its unique keys is already taken.
    /// The check and the write happen atomically. Fails with
    /// `StaffError::Conflict` on a collision.
    async fn insert_if_absent(&self, record: &StaffRecord) -> StaffResult<()>;

    /// Non-authoritative check for any record using one of the given keys.
    async fn is_taken(&self, staff_id: &str, work_email: &str, personal_email: &str) -> StaffResult<bool>;

    /// Retrieves a record by its external staff id.
    async fn get_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>>;

    /// Retrieves a record by normalized work email.
    async fn get_by_work_email(&self, work_email: &str) -> StaffResult<Option<StaffRecord>>;

    /// All records, ordered by staff id.
    async fn list(&self) -> StaffResult<Vec<StaffRecord>>;

    /// Replaces the password hash and bumps `updated_at`. Returns the updated
    /// record, or `None` if the staff id is unknown.
    async fn update_password_hash(&self, staff_id: &str, password_hash: &str) -> StaffResult<Option<StaffRecord>>;

    /// Removes a record together with its index entries. Returns the removed
    /// record, or `None` if the staff id is unknown.
    async fn delete_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>>;

    async fn list_by_role(&self, role: Role) -> StaffResult<Vec<StaffRecord>> {
        Ok(self.list().await?.into_iter().filter(|r| r.role == role).collect())
    }

    /// Group-by-role counts. Only roles with at least one record appear.
    async fn count_by_role(&self) -> StaffResult<Vec<RoleCount>> {
        let mut counts: BTreeMap<Role, usize> = BTreeMap::new();
        for record in self.list().await? {
            *counts.entry(record.role).or_default() += 1;
        }
        Ok(counts.into_iter().map(|(role, count)| RoleCount { role, count }).collect())
    }
}

/// Storage for nurse-to-doctor assistance requests.
#[async_trait]
pub trait NurseRequestStorageEngine: Send + Sync + 'static {
    async fn create(&self, request: &NurseRequest) -> StaffResult<()>;

    /// All requests, oldest first.
    async fn list(&self) -> StaffResult<Vec<NurseRequest>>;

    /// Applies a status update atomically. A missing or blank status keeps
    /// the current value. Returns `None` if the id is unknown.
    async fn update_status(&self, id: &Uuid, status: Option<&str>) -> StaffResult<Option<NurseRequest>>;
}
