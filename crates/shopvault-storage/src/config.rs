//! Storage configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! key_prefix = "acc:"
//! default_account = "default"
//! placeholder_name = "New Company"
//! extra_global_keys = ["printer_profile"]
//! ```

use crate::error::ConfigError;
use crate::keys::{
    GlobalKeySet, KeyScope, ACCOUNTS_KEY, ACTIVE_ACCOUNT_KEY, DEFAULT_GLOBAL_KEYS,
    DEFAULT_KEY_PREFIX, KEY_SEPARATOR,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sentinel account id used when no account exists or none is selected
pub const DEFAULT_ACCOUNT_ID: &str = "default";

/// Display name substituted for blank account names
pub const DEFAULT_PLACEHOLDER_NAME: &str = "New Company";

/// Storage and account configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Prefix marking namespaced keys
    pub key_prefix: String,
    /// Sentinel account id
    pub default_account: String,
    /// Name given to accounts created with a blank name
    pub placeholder_name: String,
    /// Keys never namespaced (replaces the built-in list)
    pub global_keys: Vec<String>,
    /// Keys never namespaced (added to `global_keys`)
    pub extra_global_keys: Vec<String>,
}

impl StorageConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With additional global key
    #[inline]
    #[must_use]
    pub fn with_global_key(mut self, key: impl Into<String>) -> Self {
        self.extra_global_keys.push(key.into());
        self
    }

    /// With custom key prefix
    #[inline]
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// With custom placeholder name
    #[inline]
    #[must_use]
    pub fn with_placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = name.into();
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for inconsistent values.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// Fails if the file cannot be read or does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check value consistency
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "key_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        if self.default_account.trim().is_empty() || self.default_account.contains(KEY_SEPARATOR) {
            return Err(ConfigError::Invalid {
                field: "default_account",
                reason: format!("must be non-empty and free of '{KEY_SEPARATOR}'"),
            });
        }
        if self.placeholder_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "placeholder_name",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }

    /// Build the namespacing rules described by this config
    ///
    /// The registry and active-account keys are always global: scoping the
    /// namespacing metadata by itself would make it unreachable.
    #[must_use]
    pub fn key_scope(&self) -> KeyScope {
        let mut globals: GlobalKeySet = self
            .global_keys
            .iter()
            .chain(&self.extra_global_keys)
            .cloned()
            .collect();
        globals.insert(ACCOUNTS_KEY);
        globals.insert(ACTIVE_ACCOUNT_KEY);
        KeyScope::new(self.key_prefix.clone(), globals)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_account: DEFAULT_ACCOUNT_ID.to_string(),
            placeholder_name: DEFAULT_PLACEHOLDER_NAME.to_string(),
            global_keys: DEFAULT_GLOBAL_KEYS.iter().map(ToString::to_string).collect(),
            extra_global_keys: Vec::new(),
        }
    }
}
