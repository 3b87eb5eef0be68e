//! End-to-end account switching scenarios

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shopvault_accounts::{Account, NoticeKind, NoticeLevel};
use shopvault_storage::{FileStore, KvStore, ScopedStorage, Storage, StorageConfig};
use shopvault_test_utils::{mounted_device, TestDevice};
use std::sync::Arc;

#[test]
fn customers_do_not_leak_between_accounts() {
    let (device, manager) = mounted_device();

    let acme = manager.create_account("Acme").unwrap();
    assert_eq!(manager.active_account_id(), acme.id.as_str());
    device
        .storage
        .set_json("customers", &json!([{ "id": 1 }]))
        .unwrap();

    let beta = manager.create_account("Beta").unwrap();
    assert!(manager.switch_account(beta.id.as_str()).unwrap());
    assert_eq!(device.storage.get_json::<Value>("customers").unwrap(), None);

    manager.switch_account(acme.id.as_str()).unwrap();
    assert_eq!(
        device.storage.get_json::<Value>("customers").unwrap(),
        Some(json!([{ "id": 1 }]))
    );
}

#[test]
fn legacy_settings_reach_new_account_through_fallback() {
    let device = TestDevice::new();
    let manager = device.mount();
    assert_eq!(manager.active_account_id(), "default");

    // Written before namespacing existed.
    device
        .backend
        .set_item("settings", r#"{"theme":"dark"}"#)
        .unwrap();

    let acme = manager.create_account("Acme").unwrap();
    manager.switch_account(acme.id.as_str()).unwrap();
    assert_eq!(
        device.storage.get_json::<Value>("settings").unwrap(),
        Some(json!({ "theme": "dark" }))
    );

    device
        .storage
        .set_json("settings", &json!({ "theme": "light" }))
        .unwrap();
    assert_eq!(
        device.storage.get_json::<Value>("settings").unwrap(),
        Some(json!({ "theme": "light" }))
    );
    assert_eq!(
        device.backend.get_item("settings").unwrap().as_deref(),
        Some(r#"{"theme":"dark"}"#)
    );
}

#[test]
fn deleting_only_account_resets_to_sentinel() {
    let (device, manager) = mounted_device();
    let acme = manager.create_account("Acme").unwrap();

    assert!(manager.delete_account(acme.id.as_str()).unwrap());
    assert_eq!(manager.active_account_id(), "default");
    assert_eq!(
        device.backend.get_item("active_account_id").unwrap().as_deref(),
        Some("default")
    );
}

#[test]
fn switching_to_missing_account_changes_nothing() {
    let (device, manager) = mounted_device();
    let acme = manager.create_account("Acme").unwrap();
    device.notices.drain();

    assert!(!manager.switch_account("acc_does_not_exist").unwrap());
    assert_eq!(manager.active_account_id(), acme.id.as_str());
    assert_eq!(
        device.backend.get_item("active_account_id").unwrap().as_deref(),
        Some(acme.id.as_str())
    );

    let notices = device.notices.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].kind, NoticeKind::UnknownAccount);
}

#[test]
fn remounting_does_not_double_scope() {
    let device = TestDevice::new();
    let first = device.mount();
    let acme = first.create_account("Acme").unwrap();

    let managers: Vec<_> = (0..5).map(|_| device.mount()).collect();
    assert!(managers
        .iter()
        .all(|m| m.active_account_id() == acme.id.as_str()));

    device.storage.set("invoices", "[]").unwrap();
    let keys = device.backend.keys().unwrap();
    let scoped: Vec<_> = keys.iter().filter(|k| k.starts_with("acc:")).collect();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].matches("acc:").count(), 1);
    assert_eq!(scoped[0], &format!("acc:{}:invoices", acme.id));
}

#[test]
fn concurrent_managers_keep_each_others_accounts() {
    let device = TestDevice::new();
    let first = device.mount();
    let second = device.mount();

    let acme = first.create_account("Acme").unwrap();
    let beta = second.create_account("Beta").unwrap();

    let stored: Vec<Account> = device.storage.get_json("local_accounts").unwrap().unwrap();
    let names: Vec<_> = stored.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Beta", "Acme"]);

    // Stale view until the next mutation or refresh.
    assert!(first.get(beta.id.as_str()).is_none());
    assert!(first.rename_account(beta.id.as_str(), "Beta Ltd").unwrap());
    assert_eq!(second.len(), 2);
    second.refresh().unwrap();
    assert_eq!(second.get(beta.id.as_str()).unwrap().name, "Beta Ltd");

    assert!(second.delete_account(acme.id.as_str()).unwrap());
    first.refresh().unwrap();
    assert!(first.get(acme.id.as_str()).is_none());
    assert_eq!(first.len(), 1);
}

#[test]
fn active_account_survives_restart() {
    let device = TestDevice::new();
    let manager = device.mount();
    let acme = manager.create_account("Acme").unwrap();
    manager.create_account("Beta").unwrap();
    manager.switch_account(acme.id.as_str()).unwrap();
    device.storage.set("products", r#"["soap"]"#).unwrap();

    let restarted = device.restart();
    let manager = restarted.mount();
    assert_eq!(manager.active_account_id(), acme.id.as_str());
    assert_eq!(manager.len(), 2);
    assert_eq!(
        restarted.storage.get("products").unwrap().as_deref(),
        Some(r#"["soap"]"#)
    );
}

#[test]
fn account_changed_reaches_listeners() {
    let (device, manager) = mounted_device();
    let mut listener = device.events.subscribe();

    let acme = manager.create_account("Acme").unwrap();
    let beta = manager.create_account("Beta").unwrap();
    manager.switch_account(acme.id.as_str()).unwrap();

    let seen: Vec<String> = std::iter::from_fn(|| listener.try_recv().ok())
        .map(|e| e.account_id)
        .collect();
    assert_eq!(
        seen,
        vec![
            acme.id.to_string(),
            beta.id.to_string(),
            acme.id.to_string()
        ]
    );
}

#[tokio::test]
async fn account_changed_async_listener() {
    let (device, manager) = mounted_device();
    let mut listener = device.events.subscribe();

    let acme = manager.create_account("Acme").unwrap();
    let event = listener.recv().await.unwrap();
    assert_eq!(event.account_id, acme.id.as_str());
}

#[test]
fn recency_order_is_view_only() {
    let (_device, manager) = mounted_device();
    let acme = manager.create_account("Acme").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let beta = manager.create_account("Beta").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    manager.switch_account(acme.id.as_str()).unwrap();

    let recent: Vec<_> = manager.accounts_by_recent().into_iter().map(|a| a.id).collect();
    assert_eq!(recent, vec![acme.id.clone(), beta.id.clone()]);

    let registry: Vec<_> = manager.accounts().into_iter().map(|a| a.id).collect();
    assert_eq!(registry, vec![beta.id, acme.id]);
}

#[test]
fn file_backed_device_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let config = StorageConfig::default();

    let acme_id = {
        let storage = Arc::new(ScopedStorage::from_config(
            Arc::new(FileStore::open(&path).unwrap()),
            &config,
        ));
        let manager = shopvault_accounts::AccountManager::mount(
            storage.clone(),
            &config,
            Arc::new(shopvault_accounts::RecordingNotifier::new()),
            shopvault_accounts::AccountEvents::default(),
        )
        .unwrap();
        let acme = manager.create_account("Acme").unwrap();
        storage.set("customers", "[1]").unwrap();
        acme.id
    };

    let raw = FileStore::open(&path).unwrap();
    assert_eq!(
        raw.get_item(&format!("acc:{acme_id}:customers")).unwrap().as_deref(),
        Some("[1]")
    );
    assert_eq!(
        raw.get_item("active_account_id").unwrap().as_deref(),
        Some(acme_id.as_str())
    );
}
