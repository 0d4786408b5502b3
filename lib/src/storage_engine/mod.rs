// lib/src/storage_engine/mod.rs

// Module declarations
pub mod storage_engine;
pub mod sled_storage;
pub mod inmemory_storage;
pub mod file_storage;
pub mod storage_utils;
#[cfg(test)]
pub mod test_support;

// Re-export key types and traits for external use
pub use storage_engine::{NurseRequestStorageEngine, StaffStorageEngine, STAFF_CONFLICT};
pub use sled_storage::{open_sled_db, SledNurseRequestStorage, SledStaffStorage};
pub use inmemory_storage::{InMemoryNurseRequestStorage, InMemoryStaffStorage};
pub use file_storage::{FileStorage, UploadBatch, UploadField, MAX_FILE_BYTES, PUBLIC_PREFIX};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Backend holding staff records and nurse requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    #[default]
    Sled,
    InMemory,
}

impl FromStr for StorageEngineType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageEngineType::Sled),
            "inmemory" | "memory" => Ok(StorageEngineType::InMemory),
            _ => Err(anyhow::anyhow!("Unknown storage engine type: {}", s)),
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::Sled => f.write_str("sled"),
            StorageEngineType::InMemory => f.write_str("inmemory"),
        }
    }
}

/// Both record stores, opened over the same backend.
#[derive(Clone)]
pub struct Stores {
    pub staff: Arc<dyn StaffStorageEngine>,
    pub nurse_requests: Arc<dyn NurseRequestStorageEngine>,
}

/// Creates the stores selected by `config.storage_engine`.
///
/// Sled is the default. The in-memory engine loses everything on exit and
/// is meant for tests and demos.
pub fn create_storage(config: &AppConfig) -> Result<Stores> {
    match config.storage_engine {
        StorageEngineType::Sled => {
            let db = open_sled_db(&config.database_path)?;
            Ok(Stores {
                staff: Arc::new(SledStaffStorage::new(&db)?),
                nurse_requests: Arc::new(SledNurseRequestStorage::new(&db)?),
            })
        }
        StorageEngineType::InMemory => Ok(Stores {
            staff: Arc::new(InMemoryStaffStorage::new()),
            nurse_requests: Arc::new(InMemoryNurseRequestStorage::new()),
        }),
    }
}
