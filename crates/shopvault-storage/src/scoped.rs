//! Account-scoped storage gateway
//!
//! [`ScopedStorage`] is the single facade application code reads and writes
//! through. It rewrites every non-global key into the namespace of the
//! account that is active *at call time*, so callers never thread an
//! account id around.
//!
//! # Contract
//!
//! | operation | passthrough key | scoped key |
//! |-----------|-----------------|------------|
//! | `get`     | raw read        | scoped read, else bare (legacy) read |
//! | `set`     | raw write       | scoped write only |
//! | `remove`  | raw delete      | scoped delete, then bare delete |
//!
//! Backend failures propagate unchanged.

use crate::backend::KvStore;
use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::keys::{KeyClass, KeyScope};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Key-value facade application code depends on
///
/// Implemented by [`ScopedStorage`]. Raw backends implement [`KvStore`]
/// instead, so a gateway can never end up wrapping another gateway.
pub trait Storage: Send + Sync {
    /// Read a value
    ///
    /// # Errors
    /// Propagates backend failures.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value
    ///
    /// # Errors
    /// Propagates backend failures.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value
    ///
    /// # Errors
    /// Propagates backend failures.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Read and decode a JSON value
    ///
    /// # Errors
    /// Propagates backend failures; undecodable values are
    /// [`StorageError::Serialization`].
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        Self: Sized,
    {
        self.get(key)?
            .map(|raw| serde_json::from_str(&raw).map_err(StorageError::from))
            .transpose()
    }

    /// Encode and write a JSON value
    ///
    /// # Errors
    /// Propagates encoding and backend failures.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        let encoded = serde_json::to_string(value)?;
        self.set(key, &encoded)
    }
}

/// Storage gateway scoping keys to the active account
///
/// Construct one per backend and share it as `Arc<ScopedStorage>`.
#[derive(Debug)]
pub struct ScopedStorage {
    backend: Arc<dyn KvStore>,
    scope: KeyScope,
    active: RwLock<String>,
}

impl ScopedStorage {
    /// Wrap `backend` with explicit namespacing rules
    #[must_use]
    pub fn new(
        backend: Arc<dyn KvStore>,
        scope: KeyScope,
        initial_account: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            scope,
            active: RwLock::new(initial_account.into()),
        }
    }

    /// Wrap `backend` using a [`StorageConfig`]
    #[must_use]
    pub fn from_config(backend: Arc<dyn KvStore>, config: &StorageConfig) -> Self {
        Self::new(backend, config.key_scope(), config.default_account.clone())
    }

    /// Point subsequent scoped operations at `account`
    ///
    /// Takes effect for the very next call. Intended for the account
    /// manager only; other code should treat the active account as read-only.
    pub fn set_active_account(&self, account: impl Into<String>) {
        let account = account.into();
        let mut active = self.active.write();
        if *active != account {
            tracing::debug!(
                from = active.as_str(),
                to = account.as_str(),
                "active storage namespace changed"
            );
            *active = account;
        }
    }

    /// Currently active account id
    #[must_use]
    pub fn active_account(&self) -> String {
        self.active.read().clone()
    }

    /// Namespacing rules
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &KeyScope {
        &self.scope
    }

    /// Unwrapped backend
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &Arc<dyn KvStore> {
        &self.backend
    }

    /// Original keys stored under `account`'s namespace, sorted
    ///
    /// # Errors
    /// Propagates backend failures.
    pub fn account_keys(&self, account: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .backend
            .keys()?
            .iter()
            .filter_map(|stored| self.scope.parse_scoped(stored))
            .filter(|(owner, _)| *owner == account)
            .map(|(_, key)| key.to_string())
            .collect())
    }

    /// Distinct account ids owning at least one scoped entry
    ///
    /// Includes namespaces left behind by deleted accounts.
    ///
    /// # Errors
    /// Propagates backend failures.
    pub fn namespaces(&self) -> Result<Vec<String>, StorageError> {
        let owners: BTreeSet<String> = self
            .backend
            .keys()?
            .iter()
            .filter_map(|stored| self.scope.parse_scoped(stored))
            .map(|(owner, _)| owner.to_string())
            .collect();
        Ok(owners.into_iter().collect())
    }

    fn scoped(&self, key: &str) -> Option<String> {
        match self.scope.classify(key) {
            KeyClass::Passthrough => None,
            KeyClass::Scoped => {
                let account = self.active.read();
                Some(self.scope.scoped_key(&account, key))
            }
        }
    }
}

impl Storage for ScopedStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(scoped) = self.scoped(key) else {
            return self.backend.get_item(key);
        };
        tracing::trace!(key, scoped = %scoped, "scoped read");
        if let Some(value) = self.backend.get_item(&scoped)? {
            return Ok(Some(value));
        }
        let legacy = self.backend.get_item(key)?;
        if legacy.is_some() {
            tracing::debug!(key, "served legacy unscoped value");
        }
        Ok(legacy)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self.scoped(key) {
            Some(scoped) => {
                tracing::trace!(key, scoped = %scoped, "scoped write");
                self.backend.set_item(&scoped, value)
            }
            None => self.backend.set_item(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let Some(scoped) = self.scoped(key) else {
            return self.backend.remove_item(key);
        };
        tracing::trace!(key, scoped = %scoped, "scoped remove");
        self.backend.remove_item(&scoped)?;
        // Legacy cleanup so the bare value cannot resurface through the read fallback.
        self.backend.remove_item(key)
    }
}
