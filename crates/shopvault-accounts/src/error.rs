//! Error types for account management
//!
//! Invalid input and unknown ids are recovered locally (placeholder names,
//! no-ops, error notices). Only storage failures surface as errors.

use shopvault_storage::StorageError;

/// Account operation error
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Persisting the registry or active pointer failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AccountError {
    /// Check if the underlying storage rejected a write for quota
    #[inline]
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Self::Storage(err) => err.is_quota_exceeded(),
        }
    }
}
