//! shopvault Storage
//!
//! Key-value storage shared by several company accounts on one device.
//!
//! # Core Concepts
//!
//! - [`KvStore`]: raw flat key-value primitive ([`MemoryStore`], [`FileStore`])
//! - [`KeyScope`]: namespacing rules and the [`GlobalKeySet`]
//! - [`ScopedStorage`]: gateway rewriting keys into the active account's namespace
//! - [`Storage`]: the facade trait application code is written against
//!
//! # Example
//!
//! ```rust
//! use shopvault_storage::{KvStore, MemoryStore, ScopedStorage, Storage, StorageConfig};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MemoryStore::new());
//! let storage = ScopedStorage::from_config(backend.clone(), &StorageConfig::default());
//!
//! storage.set_active_account("acc_1");
//! storage.set("customers", "[]").unwrap();
//!
//! assert_eq!(backend.get_item("acc:acc_1:customers").unwrap().as_deref(), Some("[]"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod config;
pub mod error;
pub mod file;
pub mod keys;
pub mod scoped;

// Re-exports
pub use backend::{KvStore, MemoryStore};
pub use config::{StorageConfig, DEFAULT_ACCOUNT_ID, DEFAULT_PLACEHOLDER_NAME};
pub use error::{ConfigError, StorageError};
pub use file::FileStore;
pub use keys::{
    GlobalKeySet, KeyClass, KeyScope, ACCOUNTS_KEY, ACTIVE_ACCOUNT_KEY, DEFAULT_GLOBAL_KEYS,
    DEFAULT_KEY_PREFIX,
};
pub use scoped::{ScopedStorage, Storage};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with scoped storage
    pub use crate::{KvStore, MemoryStore, ScopedStorage, Storage, StorageConfig, StorageError};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
