//! # Store Errors

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record under this marketing year
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Mirror file could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),
}
