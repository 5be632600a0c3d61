//! Snapshot backend trait definition.

use crate::error::StorageResult;

/// A whole-snapshot storage backend.
///
/// Backends are **opaque byte stores**: they hold exactly one snapshot (the
/// encoded root table) and replace it wholesale. They do not interpret the
/// bytes; the codec owns the format.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `persist`,
///   or `None` if nothing has ever been persisted
/// - `persist` is atomic: a reader never observes a partially-written
///   snapshot, even across a crash mid-persist
/// - A failed `persist` leaves either the previous snapshot or the new one
///   in place, never a mix of the two
///
/// # Implementors
///
/// - [`super::FileBackend`] - persistent storage via write-temp/rename
/// - [`super::InMemoryBackend`] - for testing and ephemeral stores
pub trait SnapshotBackend: Send + Sync {
    /// Reads the current snapshot.
    ///
    /// Returns `Ok(None)` if no snapshot exists yet; the caller decides how
    /// to initialize, absence is not an error at this layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Durably replaces the snapshot with `bytes`.
    ///
    /// After this returns successfully, `load` returns `bytes` even across
    /// process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be completed durably. A failed
    /// persist usually leaves the previous snapshot in place, but the new
    /// snapshot may already have taken effect: [`super::FileBackend`]
    /// reports a directory-fsync error even though the rename before it
    /// succeeded. Either way the snapshot is one of the two complete states.
    fn persist(&self, bytes: &[u8]) -> StorageResult<()>;
}
