// lib/src/lib.rs

//! Storage and configuration for the MediStaff server: the credential store,
//! the nurse-request store, attachment storage on disk and config loading.

pub mod config;
pub mod storage_engine;

pub use crate::config::{AppConfig, ConfigOverrides};
pub use crate::storage_engine::{
    FileStorage, NurseRequestStorageEngine, StaffStorageEngine, StorageEngineType, Stores, UploadBatch,
    UploadField, create_storage, open_sled_db,
};
