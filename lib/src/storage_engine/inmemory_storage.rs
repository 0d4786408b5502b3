// lib/src/storage_engine/inmemory_storage.rs
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use models::errors::{StaffError, StaffResult};
use models::{NurseRequest, StaffRecord};

use super::storage_engine::{NurseRequestStorageEngine, StaffStorageEngine, STAFF_CONFLICT};

#[derive(Debug, Default)]
struct StaffTables {
    records: BTreeMap<String, StaffRecord>,
    work_emails: HashMap<String, String>,
    personal_emails: HashMap<String, String>,
}

impl StaffTables {
    fn is_taken(&self, staff_id: &str, work_email: &str, personal_email: &str) -> bool {
        self.records.contains_key(staff_id)
            || self.work_emails.contains_key(work_email)
            || self.personal_emails.contains_key(personal_email)
    }
}

/// Credential store held in process memory, for tests and throwaway runs.
/// All mutations happen under one write guard, which makes them atomic.
#[derive(Debug, Default)]
pub struct InMemoryStaffStorage {
    tables: RwLock<StaffTables>,
}

impl InMemoryStaffStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StaffStorageEngine for InMemoryStaffStorage {
    async fn insert_if_absent(&self, record: &StaffRecord) -> StaffResult<()> {
        let mut tables = self.tables.write().await;
        if tables.is_taken(&record.staff_id, &record.work_email, &record.personal_email) {
            return Err(StaffError::conflict(STAFF_CONFLICT));
        }
        tables.work_emails.insert(record.work_email.clone(), record.staff_id.clone());
        tables.personal_emails.insert(record.personal_email.clone(), record.staff_id.clone());
        tables.records.insert(record.staff_id.clone(), record.clone());
        Ok(())
    }

    async fn is_taken(&self, staff_id: &str, work_email: &str, personal_email: &str) -> StaffResult<bool> {
        Ok(self.tables.read().await.is_taken(staff_id, work_email, personal_email))
    }

    async fn get_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>> {
        Ok(self.tables.read().await.records.get(staff_id).cloned())
    }

    async fn get_by_work_email(&self, work_email: &str) -> StaffResult<Option<StaffRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.work_emails.get(work_email).and_then(|id| tables.records.get(id)).cloned())
    }

    async fn list(&self) -> StaffResult<Vec<StaffRecord>> {
        Ok(self.tables.read().await.records.values().cloned().collect())
    }

    async fn update_password_hash(&self, staff_id: &str, password_hash: &str) -> StaffResult<Option<StaffRecord>> {
        let mut tables = self.tables.write().await;
        Ok(tables.records.get_mut(staff_id).map(|record| {
            record.password_hash = password_hash.to_string();
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn delete_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>> {
        let mut tables = self.tables.write().await;
        let removed = tables.records.remove(staff_id);
        if let Some(record) = &removed {
            tables.work_emails.remove(&record.work_email);
            tables.personal_emails.remove(&record.personal_email);
        }
        Ok(removed)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNurseRequestStorage {
    requests: RwLock<HashMap<Uuid, NurseRequest>>,
}

impl InMemoryNurseRequestStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NurseRequestStorageEngine for InMemoryNurseRequestStorage {
    async fn create(&self, request: &NurseRequest) -> StaffResult<()> {
        self.requests.write().await.insert(request.id, request.clone());
        Ok(())
    }

    async fn list(&self) -> StaffResult<Vec<NurseRequest>> {
        let mut requests: Vec<NurseRequest> = self.requests.read().await.values().cloned().collect();
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn update_status(&self, id: &Uuid, status: Option<&str>) -> StaffResult<Option<NurseRequest>> {
        let mut requests = self.requests.write().await;
        Ok(requests.get_mut(id).map(|request| {
            request.apply_status(status);
            request.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_engine::test_support::{nurse_request, staff_record};
    use models::Role;
    use std::sync::Arc;

    #[tokio::test]
    async fn should_enforce_uniqueness_under_concurrent_inserts() {
        let storage = Arc::new(InMemoryStaffStorage::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                let record = staff_record(&format!("S{i}"), "same@x.com", &format!("p{i}@x.com"), Role::Nurse);
                storage.insert_if_absent(&record).await
            }));
        }
        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(err) => assert!(matches!(err, StaffError::Conflict(_))),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(storage.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_list_in_staff_id_order() {
        let storage = InMemoryStaffStorage::new();
        storage.insert_if_absent(&staff_record("S2", "b@x.com", "b2@x.com", Role::Doctor)).await.unwrap();
        storage.insert_if_absent(&staff_record("S1", "a@x.com", "a2@x.com", Role::Admin)).await.unwrap();
        let ids: Vec<String> = storage.list().await.unwrap().into_iter().map(|r| r.staff_id).collect();
        assert_eq!(ids, vec!["S1", "S2"]);
    }

    #[tokio::test]
    async fn should_free_emails_after_delete() {
        let storage = InMemoryStaffStorage::new();
        storage.insert_if_absent(&staff_record("S1", "a@x.com", "a2@x.com", Role::Doctor)).await.unwrap();
        assert!(storage.delete_by_staff_id("S1").await.unwrap().is_some());
        assert!(!storage.is_taken("S1", "a@x.com", "a2@x.com").await.unwrap());
        assert_eq!(storage.get_by_work_email("a@x.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_return_none_for_unknown_nurse_request() {
        let storage = InMemoryNurseRequestStorage::new();
        storage.create(&nurse_request("N1", "D1")).await.unwrap();
        assert_eq!(storage.update_status(&Uuid::new_v4(), Some("Attended")).await.unwrap(), None);
        assert_eq!(storage.list().await.unwrap().len(), 1);
    }
}
