//! Error types for the store.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure during load or persist.
    #[error("storage error: {0}")]
    Storage(#[from] persistdb_storage::StorageError),

    /// Encode-side codec failure (e.g. a value nested too deeply).
    #[error("codec error: {0}")]
    Codec(#[from] persistdb_codec::CodecError),

    /// The persisted bytes cannot be decoded into a valid root table.
    ///
    /// The store stays unusable until the file is repaired or reset
    /// externally; it is never reset automatically.
    #[error("corrupt store: {message}")]
    Corrupt {
        /// Description of the corruption.
        message: String,
    },

    /// A transaction was requested while one is already active on this
    /// store. The caller may retry once the in-flight transaction completes.
    #[error("a transaction is already active on this store")]
    TransactionConflict,

    /// An operation was attempted on a transaction that has already
    /// committed or aborted.
    #[error("transaction has already committed or aborted")]
    TransactionClosed,

    /// The store file does not exist and creation was disabled.
    #[error("store file not found: {path}")]
    NotFound {
        /// The configured store path.
        path: PathBuf,
    },

    /// The store file already exists and `error_if_exists` was set.
    #[error("store file already exists: {path}")]
    AlreadyExists {
        /// The configured store path.
        path: PathBuf,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl StoreError {
    /// Creates a corrupt store error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
