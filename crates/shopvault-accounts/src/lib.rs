//! shopvault Accounts
//!
//! Local company accounts sharing one device's storage. The
//! [`AccountManager`] keeps the registry, picks the active account and
//! points the shared [`ScopedStorage`](shopvault_storage::ScopedStorage)
//! gateway at it, so every other reader and writer is namespaced without
//! knowing accounts exist.
//!
//! # Example
//!
//! ```rust
//! use shopvault_accounts::{AccountEvents, AccountManager, TracingNotifier};
//! use shopvault_storage::{MemoryStore, ScopedStorage, Storage, StorageConfig};
//! use std::sync::Arc;
//!
//! let config = StorageConfig::default();
//! let storage = Arc::new(ScopedStorage::from_config(Arc::new(MemoryStore::new()), &config));
//! let manager = AccountManager::mount(
//!     storage.clone(),
//!     &config,
//!     Arc::new(TracingNotifier),
//!     AccountEvents::default(),
//! )
//! .unwrap();
//!
//! let acme = manager.create_account("Acme").unwrap();
//! storage.set("customers", r#"[{"id":1}]"#).unwrap();
//!
//! manager.create_account("Beta").unwrap();
//! assert_eq!(storage.get("customers").unwrap(), None);
//!
//! manager.switch_account(acme.id.as_str()).unwrap();
//! assert!(storage.get("customers").unwrap().is_some());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod account;
pub mod error;
pub mod manager;
pub mod notify;

// Re-exports
pub use account::{Account, AccountId};
pub use error::AccountError;
pub use manager::AccountManager;
pub use notify::{
    AccountChanged, AccountEvents, Notice, NoticeKind, NoticeLevel, Notifier, RecordingNotifier,
    TracingNotifier, DEFAULT_EVENT_CAPACITY,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for account management
    pub use crate::{
        Account, AccountEvents, AccountId, AccountManager, Notice, NoticeKind, Notifier,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
