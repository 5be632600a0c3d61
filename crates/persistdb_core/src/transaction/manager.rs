//! Transaction manager.

use crate::error::{StoreError, StoreResult};
use crate::transaction::state::{Transaction, TransactionMode};
use parking_lot::{Mutex, MutexGuard};
use persistdb_codec::{decode_table, encode_table, RootTable};
use persistdb_storage::SnapshotBackend;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Mediates all access to a store's snapshot.
///
/// The manager guarantees:
/// - At most one active transaction per store (mutual exclusion, not
///   reentrancy); a second `begin` fails with
///   [`StoreError::TransactionConflict`] instead of blocking
/// - Every transaction starts from the latest persisted snapshot, loaded
///   fresh from the backend, never from a stale in-memory cache
/// - Commit persists through the backend's atomic replace, so the durable
///   state is always one complete snapshot, never a partial write
pub struct TransactionManager {
    backend: Arc<dyn SnapshotBackend>,
    /// Transaction lock - at most one active transaction at a time.
    lock: Mutex<()>,
}

impl TransactionManager {
    /// Creates a manager over the given backend.
    pub fn new(backend: Arc<dyn SnapshotBackend>) -> Self {
        Self {
            backend,
            lock: Mutex::new(()),
        }
    }

    /// Begins a transaction in the given mode.
    ///
    /// The returned guard holds the store's transaction lock for its whole
    /// lifetime; dropping it releases the lock on every exit path.
    ///
    /// # Errors
    ///
    /// - [`StoreError::TransactionConflict`] if a transaction is already
    ///   active on this store
    /// - [`StoreError::Corrupt`] if the persisted snapshot cannot be decoded
    /// - [`StoreError::Storage`] on I/O failure
    pub fn begin(&self, mode: TransactionMode) -> StoreResult<TransactionGuard<'_>> {
        let guard = self
            .lock
            .try_lock()
            .ok_or(StoreError::TransactionConflict)?;

        let table = self.load_table()?;
        tracing::debug!(?mode, entries = table.len(), "transaction started");

        Ok(TransactionGuard {
            txn: Transaction::new(table, mode),
            _guard: guard,
        })
    }

    /// Commits a read-write transaction.
    ///
    /// Encodes the (possibly mutated) snapshot and persists it atomically.
    /// The transaction is terminal afterwards either way: committed on
    /// success, failed if the encode or persist errored. A retry needs a
    /// fresh transaction; the durable state remains whatever was last
    /// successfully persisted.
    ///
    /// # Errors
    ///
    /// - [`StoreError::TransactionClosed`] if already terminal
    /// - [`StoreError::InvalidOperation`] for a read-only transaction
    /// - [`StoreError::Codec`] / [`StoreError::Storage`] on encode/persist
    ///   failure
    pub fn commit(&self, txn: &mut TransactionGuard<'_>) -> StoreResult<()> {
        if !txn.is_active() {
            return Err(StoreError::TransactionClosed);
        }
        if txn.mode() != TransactionMode::ReadWrite {
            return Err(StoreError::invalid_operation(
                "cannot commit a read-only transaction",
            ));
        }

        let bytes = match encode_table(txn.table()) {
            Ok(bytes) => bytes,
            Err(err) => {
                txn.mark_failed();
                tracing::debug!("transaction failed during encode");
                return Err(err.into());
            }
        };
        if let Err(err) = self.backend.persist(&bytes) {
            txn.mark_failed();
            tracing::debug!("transaction failed during persist");
            return Err(err.into());
        }

        txn.mark_committed();
        tracing::debug!(bytes = bytes.len(), "transaction committed");
        Ok(())
    }

    /// Loads the latest persisted root table.
    fn load_table(&self) -> StoreResult<RootTable> {
        let bytes = self.backend.load()?.ok_or_else(|| {
            // The facade persists an empty table before the first begin,
            // so an absent snapshot here means the file vanished under us.
            StoreError::corrupt("store snapshot is missing")
        })?;

        decode_table(&bytes).map_err(|err| StoreError::corrupt(err.to_string()))
    }
}

/// A transaction holding the store's transaction lock.
///
/// Derefs to [`Transaction`]; the lock is released when the guard drops.
pub struct TransactionGuard<'a> {
    txn: Transaction,
    _guard: MutexGuard<'a, ()>,
}

impl Deref for TransactionGuard<'_> {
    type Target = Transaction;

    fn deref(&self) -> &Transaction {
        &self.txn
    }
}

impl DerefMut for TransactionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Transaction {
        &mut self.txn
    }
}
