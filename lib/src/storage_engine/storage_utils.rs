// lib/src/storage_engine/storage_utils.rs

use bincode::config;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::Serialize;
use serde::de::DeserializeOwned;

use models::errors::StaffResult;

/// Helper to serialize a stored value to bytes using bincode.
pub fn serialize_value<T: Serialize>(value: &T) -> StaffResult<Vec<u8>> {
    Ok(encode_to_vec(value, config::standard())?)
}

/// Helper to deserialize bytes produced by [`serialize_value`].
pub fn deserialize_value<T: DeserializeOwned>(bytes: &[u8]) -> StaffResult<T> {
    let (value, _) = decode_from_slice(bytes, config::standard())?;
    Ok(value)
}
