// models/src/errors.rs

use std::io;

pub use thiserror::Error;
use tokio::task::JoinError;

#[cfg(feature = "bincode-errors")]
use bincode::error::{DecodeError, EncodeError};

/// Result alias used across the workspace.
pub type StaffResult<T> = Result<T, StaffError>;

/// Failure taxonomy of the staff service.
///
/// The first four variants are client errors and carry a message that is safe
/// to show to the caller. Everything else is a storage-class failure: the
/// cause is logged at the boundary and the caller only sees a generic message.
#[derive(Debug, Error)]
pub enum StaffError {
    /// Missing or malformed input. Nothing was mutated.
    #[error("{0}")]
    Validation(String),
    /// A uniqueness constraint was violated. Nothing was mutated.
    #[error("{0}")]
    Conflict(String),
    /// Lookup or delete of an identifier that does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Credential mismatch. The message never says which credential.
    #[error("{0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeDecode(#[from] DecodeError),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeEncode(#[from] EncodeError),
}

impl StaffError {
    pub fn validation(message: impl Into<String>) -> Self {
        StaffError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        StaffError::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        StaffError::NotFound(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        StaffError::Auth(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        StaffError::Storage(message.into())
    }

    /// HTTP status equivalent of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StaffError::Validation(_) => 400,
            StaffError::Auth(_) => 401,
            StaffError::NotFound(_) => 404,
            StaffError::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// True for errors whose message may be returned to the caller verbatim.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for StaffError {
    fn from(err: serde_json::Error) -> Self {
        StaffError::Serialization(format!("JSON processing error: {}", err))
    }
}

impl From<JoinError> for StaffError {
    fn from(err: JoinError) -> Self {
        StaffError::Internal(format!("Task failed to join: {:?}", err))
    }
}

#[cfg(feature = "sled-errors")]
impl From<sled::transaction::TransactionError<StaffError>> for StaffError {
    fn from(err: sled::transaction::TransactionError<StaffError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(inner) => inner,
            sled::transaction::TransactionError::Storage(e) => StaffError::Sled(e),
        }
    }
}
