//! Store facade.

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::transaction::{Transaction, TransactionManager, TransactionMode};
use persistdb_codec::{encode_table, RootTable, Value};
use persistdb_storage::{FileBackend, SnapshotBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default store file: a dot-prefixed file in the working directory.
pub const DEFAULT_STORE_PATH: &str = ".persistdb";

/// A single-file transactional key-value store.
///
/// `Store` is the primary entry point. Every operation runs inside a
/// transaction: the simple accessors (`keys`, `has`, `get`, `fetch`) each
/// open a read-only transaction, the simple mutators (`set`, `delete`) each
/// run one read-write transaction that commits immediately, and
/// [`transaction`](Self::transaction) exposes a read-write transaction to
/// caller-supplied logic with all-or-nothing persistence.
///
/// # Opening a Store
///
/// ```no_run
/// use persistdb_core::{Store, Value};
///
/// let store = Store::open("app.db")?;
/// store.set("sky", "blue")?;
/// assert_eq!(store.get("sky")?, Some(Value::from("blue")));
/// # Ok::<(), persistdb_core::StoreError>(())
/// ```
///
/// If no file exists at the path, one holding an empty root table is
/// created immediately, so a crash right after `open` still leaves a
/// readable store behind.
///
/// # Concurrency
///
/// A store enforces at most one active transaction at a time within the
/// process; a second transaction fails with
/// [`StoreError::TransactionConflict`]. Concurrent access to the same file
/// from multiple processes is unsupported and may corrupt the file.
pub struct Store {
    path: Option<PathBuf>,
    manager: TransactionManager,
}

impl Store {
    /// Opens the store at `path` with default configuration, creating an
    /// empty store file if none exists.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Corrupt`] if an existing file cannot be decoded
    /// - [`StoreError::Storage`] on I/O failure
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens the store at [`DEFAULT_STORE_PATH`].
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_default() -> StoreResult<Self> {
        Self::open(DEFAULT_STORE_PATH)
    }

    /// Opens the store at `path` with the given configuration.
    ///
    /// # Errors
    ///
    /// In addition to [`open`](Self::open)'s errors:
    /// - [`StoreError::NotFound`] if the file is absent and
    ///   `create_if_missing` is disabled
    /// - [`StoreError::AlreadyExists`] if the file exists and
    ///   `error_if_exists` is set
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> StoreResult<Self> {
        let path = path.as_ref();
        let backend = Arc::new(FileBackend::new(path)?);

        match backend.load()? {
            Some(_) if config.error_if_exists => {
                return Err(StoreError::AlreadyExists {
                    path: path.to_path_buf(),
                });
            }
            Some(_) => {}
            None if config.create_if_missing => {
                backend.persist(&encode_table(&RootTable::new())?)?;
                tracing::debug!(path = %path.display(), "created empty store file");
            }
            None => {
                return Err(StoreError::NotFound {
                    path: path.to_path_buf(),
                });
            }
        }

        let store = Self {
            path: Some(path.to_path_buf()),
            manager: TransactionManager::new(backend),
        };
        store.validate()?;
        tracing::debug!(path = %path.display(), "store opened");
        Ok(store)
    }

    /// Opens an ephemeral in-memory store.
    ///
    /// Useful for tests; nothing is persisted across the store's lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error only if the empty table cannot be encoded, which
    /// does not happen in practice.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_backend(Arc::new(persistdb_storage::InMemoryBackend::new()))
    }

    /// Opens a store over an explicit backend.
    ///
    /// An empty root table is persisted if the backend holds no snapshot
    /// yet. The store has no path; [`path`](Self::path) returns `None`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Corrupt`] if an existing snapshot cannot be decoded
    /// - [`StoreError::Storage`] on backend failure
    pub fn with_backend(backend: Arc<dyn SnapshotBackend>) -> StoreResult<Self> {
        if backend.load()?.is_none() {
            backend.persist(&encode_table(&RootTable::new())?)?;
        }

        let store = Self {
            path: None,
            manager: TransactionManager::new(backend),
        };
        store.validate()?;
        Ok(store)
    }

    /// Returns all root keys, in the stable canonical order.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot cannot be loaded or a transaction is active.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        self.read(|txn| txn.keys())
    }

    /// Returns `true` if `key` exists in the store.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot cannot be loaded or a transaction is active.
    pub fn has(&self, key: &str) -> StoreResult<bool> {
        self.read(|txn| txn.has(key))
    }

    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot cannot be loaded or a transaction is active.
    pub fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.read(|txn| txn.get(key).cloned())
    }

    /// Returns the value stored under `key`, or `default` if absent.
    ///
    /// The default may itself be absent: `fetch(key, None)` behaves like
    /// [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Fails if the snapshot cannot be loaded or a transaction is active.
    pub fn fetch(&self, key: &str, default: impl Into<Option<Value>>) -> StoreResult<Option<Value>> {
        let default = default.into();
        self.read(|txn| txn.get(key).cloned().or(default))
    }

    /// Sets `key` to `value` in a single read-write transaction that
    /// commits immediately.
    ///
    /// # Errors
    ///
    /// Fails if a transaction is active or the commit cannot be persisted.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> StoreResult<()> {
        let key = key.into();
        let value = value.into();
        self.transaction(|txn| txn.set(key, value))
    }

    /// Deletes zero or more keys in a single read-write transaction.
    ///
    /// Deleting an absent key is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Fails if a transaction is active or the commit cannot be persisted.
    pub fn delete(&self, keys: &[&str]) -> StoreResult<()> {
        self.transaction(|txn| {
            for key in keys {
                txn.delete(key)?;
            }
            Ok(())
        })
    }

    /// Runs `work` inside a read-write transaction with all-or-nothing
    /// persistence.
    ///
    /// The closure may perform any number of reads and writes and may call
    /// [`Transaction::abort`] to discard them. On normal completion the
    /// transaction auto-commits; if the closure returns an error, nothing
    /// is persisted and the error propagates. The transaction lock is
    /// released on every exit path.
    ///
    /// ```no_run
    /// # use persistdb_core::Store;
    /// # let store = Store::open_in_memory()?;
    /// store.transaction(|txn| {
    ///     txn.set("weather", "sunny")?;
    ///     txn.set("hour", "midday")?;
    ///     Ok(())
    /// })?;
    /// # Ok::<(), persistdb_core::StoreError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - [`StoreError::TransactionConflict`] if a transaction is already
    ///   active
    /// - any error returned by `work`
    /// - encode/persist errors from the commit
    pub fn transaction<F, T>(&self, work: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Transaction) -> StoreResult<T>,
    {
        let mut txn = self.manager.begin(TransactionMode::ReadWrite)?;
        let value = work(&mut txn)?;
        if txn.is_active() {
            self.manager.commit(&mut txn)?;
        }
        Ok(value)
    }

    /// Returns the configured store file path, or `None` for a store opened
    /// over an explicit backend. Performs no I/O.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Opens a read-only transaction and applies `read` to it.
    fn read<F, T>(&self, read: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction) -> T,
    {
        let txn = self.manager.begin(TransactionMode::ReadOnly)?;
        Ok(read(&txn))
    }

    /// Confirms the persisted snapshot decodes by opening a read-only
    /// transaction against it.
    fn validate(&self) -> StoreResult<()> {
        self.manager.begin(TransactionMode::ReadOnly).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let store = Store::open_in_memory().unwrap();

        store.set("sky", "blue").unwrap();
        assert_eq!(store.get("sky").unwrap(), Some(Value::from("blue")));
        assert!(store.has("sky").unwrap());
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn fetch_with_and_without_default() {
        let store = Store::open_in_memory().unwrap();
        store.set("sky", "blue").unwrap();

        assert_eq!(
            store.fetch("sky", Value::from("fallback")).unwrap(),
            Some(Value::from("blue"))
        );
        assert_eq!(
            store.fetch("missing", Value::from("fallback")).unwrap(),
            Some(Value::from("fallback"))
        );
        assert_eq!(store.fetch("missing", None).unwrap(), None);
    }

    #[test]
    fn delete_multiple_keys() {
        let store = Store::open_in_memory().unwrap();
        store.set("one", 1i64).unwrap();
        store.set("two", 2i64).unwrap();
        store.set("three", 3i64).unwrap();

        store.delete(&["one", "three", "never-existed"]).unwrap();

        assert_eq!(store.keys().unwrap(), vec!["two"]);
    }

    #[test]
    fn delete_nothing_is_fine() {
        let store = Store::open_in_memory().unwrap();
        store.delete(&[]).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn transaction_auto_commits() {
        let store = Store::open_in_memory().unwrap();

        store
            .transaction(|txn| {
                txn.set("weather", "sunny")?;
                txn.set("hour", "midday")?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.get("weather").unwrap(), Some(Value::from("sunny")));
        assert_eq!(store.get("hour").unwrap(), Some(Value::from("midday")));
    }

    #[test]
    fn transaction_abort_discards_everything() {
        let store = Store::open_in_memory().unwrap();

        store
            .transaction(|txn| {
                txn.set("pre", "before")?;
                txn.abort()?;
                Ok(())
            })
            .unwrap();

        assert!(!store.has("pre").unwrap());
    }

    #[test]
    fn transaction_error_skips_commit() {
        let store = Store::open_in_memory().unwrap();

        let result: StoreResult<()> = store.transaction(|txn| {
            txn.set("doomed", "value")?;
            Err(StoreError::invalid_operation("caller failure"))
        });

        assert!(matches!(result, Err(StoreError::InvalidOperation { .. })));
        assert!(!store.has("doomed").unwrap());

        // The lock was released on the error path
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn mutation_after_abort_inside_transaction_fails() {
        let store = Store::open_in_memory().unwrap();

        let result: StoreResult<()> = store.transaction(|txn| {
            txn.set("pre", "before")?;
            txn.abort()?;
            txn.set("post", "after")
        });

        assert!(matches!(result, Err(StoreError::TransactionClosed)));
        assert!(!store.has("pre").unwrap());
        assert!(!store.has("post").unwrap());
    }

    #[test]
    fn transaction_returns_closure_value() {
        let store = Store::open_in_memory().unwrap();

        let count = store
            .transaction(|txn| {
                txn.set("a", 1i64)?;
                txn.set("b", 2i64)?;
                Ok(txn.keys().len())
            })
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn path_is_none_for_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.path(), None);
    }
}
