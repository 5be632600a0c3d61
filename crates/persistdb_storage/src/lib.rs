//! # persistdb Storage
//!
//! Snapshot backend trait and implementations for persistdb.
//!
//! This crate provides the lowest-level storage abstraction for the store.
//! Backends are **opaque byte stores** holding exactly one snapshot - they
//! do not interpret the data they hold.
//!
//! ## Design Principles
//!
//! - Backends hold one snapshot and replace it wholesale (load, persist)
//! - A persist is all-or-nothing: a crash mid-persist leaves either the old
//!   snapshot or the new one, never a mix
//! - Must be `Send + Sync` for sharing behind a store handle
//! - The codec owns all byte-format interpretation
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - persistent storage using write-temp/fsync/rename
//! - [`InMemoryBackend`] - for testing and ephemeral storage
//!
//! ## Example
//!
//! ```rust
//! use persistdb_storage::{InMemoryBackend, SnapshotBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.persist(b"hello world").unwrap();
//! assert_eq!(backend.load().unwrap().unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::SnapshotBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
