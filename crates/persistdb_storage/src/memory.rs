//! In-memory snapshot backend for testing.

use crate::backend::SnapshotBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory snapshot backend.
///
/// Holds the snapshot in memory and is suitable for:
/// - Unit and integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Failure Injection
///
/// [`fail_next_persist`](Self::fail_next_persist) arms a one-shot injected
/// I/O failure on the next `persist` call, for testing that a failed commit
/// leaves the snapshot byte-identical.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
    fail_next_persist: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new backend with no snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding a pre-existing snapshot.
    ///
    /// Useful for testing recovery and corruption handling.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            fail_next_persist: AtomicBool::new(false),
        }
    }

    /// Returns a copy of the current snapshot, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }

    /// Arms a one-shot failure: the next `persist` call fails with an I/O
    /// error and leaves the snapshot unchanged.
    pub fn fail_next_persist(&self) {
        self.fail_next_persist.store(true, Ordering::SeqCst);
    }
}

impl SnapshotBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn persist(&self, bytes: &[u8]) -> StorageResult<()> {
        if self.fail_next_persist.swap(false, Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected persist failure").into());
        }

        *self.data.write() = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        assert!(backend.data().is_none());
    }

    #[test]
    fn persist_replaces_snapshot() {
        let backend = InMemoryBackend::new();

        backend.persist(b"one").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"one");

        backend.persist(b"two").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"two");
    }

    #[test]
    fn with_data_loads_seed() {
        let backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        assert_eq!(backend.load().unwrap().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn injected_failure_is_one_shot_and_preserves_snapshot() {
        let backend = InMemoryBackend::new();
        backend.persist(b"before").unwrap();

        backend.fail_next_persist();
        assert!(backend.persist(b"after").is_err());
        assert_eq!(backend.load().unwrap().unwrap(), b"before");

        // The failure was one-shot
        backend.persist(b"after").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"after");
    }
}
