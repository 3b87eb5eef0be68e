//! Testing utilities for shopvault workspace
//!
//! Shared fixtures wiring a backend, a gateway and an account manager.

#![allow(missing_docs)]

use shopvault_accounts::{AccountEvents, AccountManager, RecordingNotifier};
use shopvault_storage::{MemoryStore, ScopedStorage, StorageConfig};
use std::sync::Arc;

/// One device: a raw backend, its single gateway, and the notice/event sinks
pub struct TestDevice {
    pub config: StorageConfig,
    pub backend: Arc<MemoryStore>,
    pub storage: Arc<ScopedStorage>,
    pub notices: Arc<RecordingNotifier>,
    pub events: AccountEvents,
}

impl TestDevice {
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    pub fn with_config(config: StorageConfig) -> Self {
        Self::with_backend(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_backend(config: StorageConfig, backend: Arc<MemoryStore>) -> Self {
        let storage = Arc::new(ScopedStorage::from_config(backend.clone(), &config));
        Self {
            config,
            backend,
            storage,
            notices: Arc::new(RecordingNotifier::new()),
            events: AccountEvents::default(),
        }
    }

    /// Mount an account manager on this device's gateway
    pub fn mount(&self) -> AccountManager {
        AccountManager::mount(
            self.storage.clone(),
            &self.config,
            self.notices.clone(),
            self.events.clone(),
        )
        .unwrap()
    }

    /// Simulate a process restart: same backend, new gateway
    pub fn restart(&self) -> Self {
        Self::with_backend(self.config.clone(), self.backend.clone())
    }
}

impl Default for TestDevice {
    fn default() -> Self {
        Self::new()
    }
}

pub fn mounted_device() -> (TestDevice, AccountManager) {
    let device = TestDevice::new();
    let manager = device.mount();
    (device, manager)
}
