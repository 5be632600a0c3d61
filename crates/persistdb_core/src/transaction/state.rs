//! Transaction state.

use crate::error::{StoreError, StoreResult};
use persistdb_codec::{RootTable, Value};

/// Access mode of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Reads only; the snapshot is never written back.
    ReadOnly,
    /// Reads and writes; the snapshot is persisted on commit.
    ReadWrite,
}

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can perform operations.
    Active,
    /// Transaction has been committed.
    Committed,
    /// Transaction has been aborted.
    Aborted,
    /// Commit failed; the mutations never became durable.
    Failed,
}

/// An active transaction over a store snapshot.
///
/// A transaction works on an in-memory copy of the last persisted root
/// table. Mutations apply in place and become durable only on commit; an
/// abort discards them and leaves the file untouched. Once committed,
/// aborted, or failed the transaction is terminal and further mutation
/// fails with [`StoreError::TransactionClosed`].
#[derive(Debug)]
pub struct Transaction {
    table: RootTable,
    mode: TransactionMode,
    state: TransactionState,
}

impl Transaction {
    pub(crate) fn new(table: RootTable, mode: TransactionMode) -> Self {
        Self {
            table,
            mode,
            state: TransactionState::Active,
        }
    }

    /// Returns the access mode.
    #[must_use]
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Returns all root keys in canonical order.
    ///
    /// The order is stable for a given snapshot: repeated calls return the
    /// same sequence.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.table.keys().map(str::to_string).collect()
    }

    /// Returns `true` if `key` is present in the snapshot.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Returns the value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.table.get(key)
    }

    /// Sets `key` to `value` in the in-memory snapshot.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::TransactionClosed`] after commit or abort,
    /// or [`StoreError::InvalidOperation`] on a read-only transaction.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> StoreResult<()> {
        self.ensure_active()?;
        self.ensure_writable()?;
        self.table.insert(key, value);
        Ok(())
    }

    /// Deletes `key` from the in-memory snapshot, returning its value if it
    /// was present. Deleting an absent key is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::TransactionClosed`] after commit or abort,
    /// or [`StoreError::InvalidOperation`] on a read-only transaction.
    pub fn delete(&mut self, key: &str) -> StoreResult<Option<Value>> {
        self.ensure_active()?;
        self.ensure_writable()?;
        Ok(self.table.remove(key))
    }

    /// Aborts the transaction.
    ///
    /// All mutations made so far are discarded and the on-disk file stays
    /// untouched. The transaction is terminal afterwards.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::TransactionClosed`] if already terminal.
    pub fn abort(&mut self) -> StoreResult<()> {
        self.ensure_active()?;
        self.state = TransactionState::Aborted;
        tracing::debug!("transaction aborted");
        Ok(())
    }

    pub(crate) fn table(&self) -> &RootTable {
        &self.table
    }

    pub(crate) fn mark_committed(&mut self) {
        self.state = TransactionState::Committed;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.state = TransactionState::Failed;
    }

    fn ensure_active(&self) -> StoreResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(StoreError::TransactionClosed)
        }
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        if self.mode == TransactionMode::ReadWrite {
            Ok(())
        } else {
            Err(StoreError::invalid_operation(
                "cannot mutate through a read-only transaction",
            ))
        }
    }
}
