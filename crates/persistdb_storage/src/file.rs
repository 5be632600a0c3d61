//! File-based snapshot backend.

use crate::backend::SnapshotBackend;
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// A file-based snapshot backend.
///
/// Stores the snapshot in a single file and replaces it with the
/// write-then-rename pattern for crash safety:
///
/// 1. Write the new snapshot to `<file>.tmp` in the same directory
///    (same filesystem, so the rename below is atomic)
/// 2. Sync the temporary file to disk
/// 3. Rename the temporary file over the target
/// 4. Fsync the directory so the rename itself is durable
///
/// If the process crashes at any point, the target file holds either the
/// previous snapshot or the new one, never a mix. The same holds for
/// reported errors: a failure in steps 1-3 leaves the target untouched,
/// while a failure in step 4 surfaces as an error even though the new
/// snapshot is already in place.
///
/// # Concurrency
///
/// Single-process only. Two processes persisting to the same path have
/// undefined interleaving; there is no cross-process file locking.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    temp_path: PathBuf,
}

impl FileBackend {
    /// Creates a backend for the store file at `path`.
    ///
    /// The file itself is not created; an absent file simply loads as
    /// `None` until the first persist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] if `path` has no file name to
    /// derive the temporary sibling from.
    pub fn new(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let file_name = path.file_name().ok_or_else(|| StorageError::InvalidPath {
            path: path.clone(),
        })?;

        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        Ok(Self { path, temp_path })
    }

    /// Returns the path of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_temp(&self, bytes: &[u8]) -> StorageResult<()> {
        let mut file = File::create(&self.temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    }

    /// Fsyncs the containing directory so a completed rename survives a
    /// crash. On Windows the NTFS journal covers metadata durability and
    /// directory handles cannot be synced this way.
    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            let dir = if parent.as_os_str().is_empty() {
                File::open(".")?
            } else {
                File::open(parent)?
            };
            dir.sync_all()?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl SnapshotBackend for FileBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    fn persist(&self, bytes: &[u8]) -> StorageResult<()> {
        if let Err(err) = self.write_temp(bytes) {
            // Target is untouched; discard the partial temp file
            let _ = fs::remove_file(&self.temp_path);
            return Err(err);
        }

        if let Err(err) = fs::rename(&self.temp_path, &self.path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(err.into());
        }

        self.sync_directory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("missing.db")).unwrap();

        assert!(backend.load().unwrap().is_none());
        assert!(!backend.path().exists());
    }

    #[test]
    fn persist_then_load() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("test.db")).unwrap();

        backend.persist(b"snapshot one").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"snapshot one");

        backend.persist(b"snapshot two").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"snapshot two");
    }

    #[test]
    fn persist_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let backend = FileBackend::new(&path).unwrap();
            backend.persist(b"durable").unwrap();
        }

        let backend = FileBackend::new(&path).unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"durable");
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("test.db")).unwrap();

        backend.persist(b"data").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("test.db")]);
    }

    #[test]
    fn failed_persist_leaves_target_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let backend = FileBackend::new(&path).unwrap();
        backend.persist(b"original").unwrap();

        // Replace the backend's directory context with an unwritable temp
        // location: pointing the temp path at a missing directory makes the
        // temp write fail before the target is touched.
        let broken = FileBackend {
            path: path.clone(),
            temp_path: dir.path().join("no-such-dir").join("test.db.tmp"),
        };
        assert!(broken.persist(b"replacement").is_err());

        assert_eq!(backend.load().unwrap().unwrap(), b"original");
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        assert!(matches!(
            FileBackend::new("/"),
            Err(StorageError::InvalidPath { .. })
        ));
    }

    #[test]
    fn bare_file_name_in_working_directory() {
        // A dot-prefixed default path has no parent component; the backend
        // must still derive a temp sibling for it.
        let backend = FileBackend::new(".persistdb").unwrap();
        assert_eq!(backend.path(), Path::new(".persistdb"));
    }
}
