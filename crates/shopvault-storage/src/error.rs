//! Error types for storage backends
//!
//! The scoped gateway never wraps or retries these: whatever the backend
//! reports is what the caller sees.

use std::path::PathBuf;

/// Storage failure reported by a [`KvStore`](crate::KvStore) backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem failure while loading or persisting a store
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Write rejected because it would exceed the backend quota
    #[error("quota exceeded: write of {requested} bytes, {used} of {limit} bytes used")]
    QuotaExceeded {
        /// Bytes the write would add
        requested: usize,
        /// Bytes currently in use
        used: usize,
        /// Configured limit
        limit: usize,
    },

    /// Backend-specific failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Check if the error is a quota rejection
    #[inline]
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`StorageConfig`](crate::StorageConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config values are inconsistent
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
