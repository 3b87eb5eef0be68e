//! Raw key-value backends
//!
//! [`KvStore`] is the unscoped platform primitive: a flat string-to-string
//! map shared by every account on the device. [`MemoryStore`] is the
//! in-process implementation; [`FileStore`](crate::FileStore) persists to disk.

use crate::error::StorageError;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt::Debug;

/// Flat string key-value storage primitive
///
/// Implementations are shared across threads behind `Arc<dyn KvStore>`.
/// Each call is atomic per key; no multi-key atomicity is offered.
pub trait KvStore: Send + Sync + Debug {
    /// Read a value
    ///
    /// # Errors
    /// Returns the backend's failure unchanged.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns the backend's failure (for example a quota rejection).
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; deleting a missing key is not an error
    ///
    /// # Errors
    /// Returns the backend's failure unchanged.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys, sorted
    ///
    /// # Errors
    /// Returns the backend's failure unchanged.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Concurrent in-memory store with an optional byte quota
///
/// The quota counts key and value bytes, the way browser storage counts
/// characters toward its per-origin limit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
    quota: Option<usize>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create empty store without a quota
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty store rejecting writes beyond `limit` bytes
    #[inline]
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Bytes currently used by keys and values
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum()
    }

    /// Number of stored entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let Some(limit) = self.quota else {
            self.entries.insert(key.to_string(), value.to_string());
            return Ok(());
        };

        // Serialize quota accounting so two writers cannot both squeeze in.
        let _guard = self.write_lock.lock();
        let existing = self
            .entries
            .get(key)
            .map_or(0, |v| key.len() + v.value().len());
        let used = self.used_bytes() - existing;
        let requested = key.len() + value.len();
        if used + requested > limit {
            return Err(StorageError::QuotaExceeded {
                requested,
                used,
                limit,
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
