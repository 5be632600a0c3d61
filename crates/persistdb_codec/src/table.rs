//! The root table: the top-level persisted mapping.

use crate::value::Value;
use std::cmp::Ordering;

/// Compare two root keys by their canonical encoded order.
///
/// Text strings encode length-first, so two keys order by byte length and
/// then bytewise. This matches the map-key order the encoder emits, which
/// keeps enumeration order identical before and after a round trip.
pub(crate) fn canonical_key_cmp(a: &str, b: &str) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

/// The top-level key-to-value mapping persisted by a store.
///
/// Keys are unique. Entries are kept in canonical key order, so repeated
/// enumeration of the same snapshot always yields the same sequence and the
/// encoded form is deterministic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootTable {
    entries: Vec<(String, Value)>,
}

impl RootTable {
    /// Creates an empty root table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).ok().map(|i| &self.entries[i].1)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_ok()
    }

    /// Inserts `value` under `key`, returning the previous value if the key
    /// was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Ok(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            Err(i) => {
                self.entries.insert(i, (key, value));
                None
            }
        }
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        match self.position(key) {
            Ok(i) => Some(self.entries.remove(i).1),
            Err(_) => None,
        }
    }

    /// Iterates over keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over entries in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Appends an entry known to sort after all existing entries.
    ///
    /// Used by the decoder, which has already validated key order.
    pub(crate) fn push_sorted(&mut self, key: String, value: Value) {
        self.entries.push((key, value));
    }

    fn position(&self, key: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(k, _)| canonical_key_cmp(k, key))
    }
}

impl FromIterator<(String, Value)> for RootTable {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut table = RootTable::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}
