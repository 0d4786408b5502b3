// lib/src/storage_engine/sled_storage.rs

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use sled::transaction::{abort, ConflictableTransactionError, Transactional};
use sled::{Db, Tree};
use uuid::Uuid;

use models::errors::{StaffError, StaffResult};
use models::{NurseRequest, StaffRecord};

use crate::storage_engine::storage_engine::{NurseRequestStorageEngine, StaffStorageEngine, STAFF_CONFLICT};
use crate::storage_engine::storage_utils::{deserialize_value, serialize_value};

const STAFF_TREE: &str = "staff";
const WORK_EMAIL_TREE: &str = "staff_by_work_email";
const PERSONAL_EMAIL_TREE: &str = "staff_by_personal_email";
const NURSE_REQUEST_TREE: &str = "nurse_requests";

/// Opens (creating if needed) the sled database at `path`.
pub fn open_sled_db(path: &Path) -> StaffResult<Db> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StaffError::storage(format!("Failed to create database directory at {:?}: {}", parent, e))
            })?;
        }
    }
    info!("Opening Sled database at {:?}", path);
    sled::Config::new()
        .path(path)
        .open()
        .map_err(|e| StaffError::storage(format!("Failed to open Sled database at {:?}: {}", path, e)))
}

/// Sled-backed credential store.
///
/// Records live in the `staff` tree keyed by staff id. Two index trees map
/// each normalized email to the owning staff id; the three trees are always
/// written in one transaction.
pub struct SledStaffStorage {
    staff: Tree,
    by_work_email: Tree,
    by_personal_email: Tree,
}

impl SledStaffStorage {
    pub fn new(db: &Db) -> StaffResult<Self> {
        Ok(Self {
            staff: db.open_tree(STAFF_TREE)?,
            by_work_email: db.open_tree(WORK_EMAIL_TREE)?,
            by_personal_email: db.open_tree(PERSONAL_EMAIL_TREE)?,
        })
    }
}

#[async_trait]
impl StaffStorageEngine for SledStaffStorage {
    async fn insert_if_absent(&self, record: &StaffRecord) -> StaffResult<()> {
        let value = serialize_value(record)?;
        let key = record.staff_id.as_bytes();

        (&self.staff, &self.by_work_email, &self.by_personal_email)
            .transaction(|(staff, work, personal)| {
                if staff.get(key)?.is_some()
                    || work.get(record.work_email.as_bytes())?.is_some()
                    || personal.get(record.personal_email.as_bytes())?.is_some()
                {
                    return abort(StaffError::conflict(STAFF_CONFLICT));
                }
                staff.insert(key, value.as_slice())?;
                work.insert(record.work_email.as_bytes(), key)?;
                personal.insert(record.personal_email.as_bytes(), key)?;
                Ok(())
            })?;
        self.staff.flush_async().await?;
        debug!("Inserted staff record {}", record.staff_id);
        Ok(())
    }

    async fn is_taken(&self, staff_id: &str, work_email: &str, personal_email: &str) -> StaffResult<bool> {
        Ok(self.staff.contains_key(staff_id.as_bytes())?
            || self.by_work_email.contains_key(work_email.as_bytes())?
            || self.by_personal_email.contains_key(personal_email.as_bytes())?)
    }

    async fn get_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>> {
        self.staff.get(staff_id.as_bytes())?.map(|bytes| deserialize_value(&bytes)).transpose()
    }

    async fn get_by_work_email(&self, work_email: &str) -> StaffResult<Option<StaffRecord>> {
        match self.by_work_email.get(work_email.as_bytes())? {
            Some(staff_id) => self.staff.get(staff_id)?.map(|bytes| deserialize_value(&bytes)).transpose(),
            None => Ok(None),
        }
    }

    async fn list(&self) -> StaffResult<Vec<StaffRecord>> {
        self.staff
            .iter()
            .values()
            .map(|item| deserialize_value(&item?))
            .collect()
    }

    async fn update_password_hash(&self, staff_id: &str, password_hash: &str) -> StaffResult<Option<StaffRecord>> {
        let updated = self.staff.transaction(|staff| {
            let Some(bytes) = staff.get(staff_id.as_bytes())? else {
                return Ok(None);
            };
            let mut record: StaffRecord = deserialize_value(&bytes).map_err(ConflictableTransactionError::Abort)?;
            record.password_hash = password_hash.to_string();
            record.updated_at = Utc::now();
            let value = serialize_value(&record).map_err(ConflictableTransactionError::Abort)?;
            staff.insert(staff_id.as_bytes(), value)?;
            Ok(Some(record))
        })?;
        self.staff.flush_async().await?;
        Ok(updated)
    }

    async fn delete_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>> {
        let removed = (&self.staff, &self.by_work_email, &self.by_personal_email)
            .transaction(|(staff, work, personal)| {
                let Some(bytes) = staff.remove(staff_id.as_bytes())? else {
                    return Ok(None);
                };
                let record: StaffRecord = deserialize_value(&bytes).map_err(ConflictableTransactionError::Abort)?;
                work.remove(record.work_email.as_bytes())?;
                personal.remove(record.personal_email.as_bytes())?;
                Ok(Some(record))
            })?;
        self.staff.flush_async().await?;
        Ok(removed)
    }
}

/// Sled-backed nurse request store, keyed by the request's UUID bytes.
pub struct SledNurseRequestStorage {
    tree: Tree,
}

impl SledNurseRequestStorage {
    pub fn new(db: &Db) -> StaffResult<Self> {
        Ok(Self { tree: db.open_tree(NURSE_REQUEST_TREE)? })
    }
}

#[async_trait]
impl NurseRequestStorageEngine for SledNurseRequestStorage {
    async fn create(&self, request: &NurseRequest) -> StaffResult<()> {
        let value = serialize_value(request)?;
        self.tree.insert(request.id.as_bytes(), value)?;
        self.tree.flush_async().await?;
        Ok(())
    }

    async fn list(&self) -> StaffResult<Vec<NurseRequest>> {
        let mut requests = self
            .tree
            .iter()
            .values()
            .map(|item| deserialize_value(&item?))
            .collect::<StaffResult<Vec<NurseRequest>>>()?;
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn update_status(&self, id: &Uuid, status: Option<&str>) -> StaffResult<Option<NurseRequest>> {
        let updated = self.tree.transaction(|tree| {
            let Some(bytes) = tree.get(id.as_bytes())? else {
                return Ok(None);
            };
            let mut request: NurseRequest = deserialize_value(&bytes).map_err(ConflictableTransactionError::Abort)?;
            request.apply_status(status);
            let value = serialize_value(&request).map_err(ConflictableTransactionError::Abort)?;
            tree.insert(id.as_bytes(), value)?;
            Ok(Some(request))
        })?;
        self.tree.flush_async().await?;
        Ok(updated)
    }
}
