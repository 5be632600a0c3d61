//! # persistdb Core
//!
//! A single-file, transactional key-value store.
//!
//! The store keeps a durable mapping from root keys to arbitrary structured
//! values, accessed exclusively inside transactions that either fully commit
//! or fully abort:
//! - Every transaction starts from the latest persisted snapshot
//! - Commits replace the store file atomically (write-temp, fsync, rename),
//!   so a crash mid-commit leaves either the old state or the new one
//! - Aborts discard the in-memory copy; the file never changes
//! - At most one transaction is active per store at a time
//!
//! ## Example
//!
//! ```no_run
//! use persistdb_core::{Store, Value};
//!
//! let store = Store::open(".persistdb")?;
//!
//! store.set("author", Value::map(vec![
//!     (Value::from("first"), Value::from("Shannon")),
//!     (Value::from("last"), Value::from("Skipper")),
//! ]))?;
//!
//! store.transaction(|txn| {
//!     txn.set("weather", "sunny")?;
//!     txn.set("hour", "midday")?;
//!     Ok(())
//! })?;
//!
//! assert!(store.has("author")?);
//! store.delete(&["author"])?;
//! # Ok::<(), persistdb_core::StoreError>(())
//! ```
//!
//! ## Limitations
//!
//! Single-process only: there is no cross-process file locking, and two
//! processes opening the same path may corrupt each other's writes.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod store;
mod transaction;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use store::{Store, DEFAULT_STORE_PATH};
pub use transaction::{Transaction, TransactionGuard, TransactionManager, TransactionMode, TransactionState};

// Re-export the value model and backends that appear in the public API.
pub use persistdb_codec::{CodecError, RootTable, Value};
pub use persistdb_storage::{FileBackend, InMemoryBackend, SnapshotBackend, StorageError};
