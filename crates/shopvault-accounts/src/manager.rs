//! Account registry and switching
//!
//! [`AccountManager`] owns the list of local accounts and decides which one
//! is active. It is the only caller of
//! [`ScopedStorage::set_active_account`]; everything else just reads and
//! writes through the shared gateway.
//!
//! # Persistence
//!
//! - `local_accounts`: JSON array of [`Account`], newest-created first
//! - `active_account_id`: bare account id (or the sentinel)
//!
//! Both keys are global, so they bypass namespacing. Every mutation reloads
//! the registry from storage, applies the change, and persists the result
//! before swapping it in; a storage failure leaves the manager unchanged and
//! is returned to the caller.

use crate::account::{Account, AccountId};
use crate::error::AccountError;
use crate::notify::{AccountChanged, AccountEvents, Notice, NoticeKind, Notifier};
use parking_lot::Mutex;
use shopvault_storage::{ScopedStorage, Storage, StorageConfig, ACCOUNTS_KEY, ACTIVE_ACCOUNT_KEY};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Local account registry bound to a scoped storage gateway
///
/// Mounting several managers against the same gateway shares the gateway
/// (it is never re-wrapped). Each manager caches the registry for queries,
/// but mutations start from the persisted registry, so one manager never
/// drops accounts created through another. Call [`AccountManager::refresh`]
/// to pick up foreign changes in the cached view.
pub struct AccountManager {
    storage: Arc<ScopedStorage>,
    notifier: Arc<dyn Notifier>,
    events: AccountEvents,
    default_account: String,
    placeholder_name: String,
    accounts: Mutex<Vec<Account>>,
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("active", &self.storage.active_account())
            .field("accounts", &self.accounts.lock().len())
            .finish_non_exhaustive()
    }
}

impl AccountManager {
    /// Load the registry from `storage` and activate the persisted account
    ///
    /// The active id is the persisted pointer when it names a registered
    /// account, else the first registered account, else the sentinel. A
    /// corrupt registry is logged and treated as empty.
    ///
    /// # Errors
    /// Propagates storage read failures.
    pub fn mount(
        storage: Arc<ScopedStorage>,
        config: &StorageConfig,
        notifier: Arc<dyn Notifier>,
        events: AccountEvents,
    ) -> Result<Self, AccountError> {
        let accounts = load_registry(&storage)?;

        let stored = storage.get(ACTIVE_ACCOUNT_KEY)?;
        let active = stored
            .as_deref()
            .filter(|id| accounts.iter().any(|a| a.id == **id))
            .map(str::to_string)
            .or_else(|| accounts.first().map(|a| a.id.to_string()))
            .unwrap_or_else(|| config.default_account.clone());
        if let Some(stored) = stored.filter(|id| *id != active && *id != config.default_account) {
            tracing::warn!(stored = %stored, active = %active, "stored active account is not registered");
        }

        tracing::debug!(accounts = accounts.len(), active = %active, "mounted account manager");
        storage.set_active_account(active);

        Ok(Self {
            storage,
            notifier,
            events,
            default_account: config.default_account.clone(),
            placeholder_name: config.placeholder_name.clone(),
            accounts: Mutex::new(accounts),
        })
    }

    /// Create an account and make it active
    ///
    /// A blank name is replaced by the placeholder and raises a warning
    /// notice; creation itself never fails on input.
    ///
    /// # Errors
    /// Propagates storage write failures.
    pub fn create_account(&self, name: &str) -> Result<Account, AccountError> {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            self.notifier.notify(Notice::warning(NoticeKind::EmptyName));
            self.placeholder_name.as_str()
        } else {
            trimmed
        };

        let mut accounts = self.accounts.lock();
        *accounts = load_registry(&self.storage)?;
        let id = loop {
            let candidate = AccountId::generate();
            if !accounts.iter().any(|a| a.id == candidate) {
                break candidate;
            }
        };
        let account = Account::with_id(id, name);

        let mut next = Vec::with_capacity(accounts.len() + 1);
        next.push(account.clone());
        next.extend(accounts.iter().cloned());
        self.persist(&next, account.id.as_str())?;
        *accounts = next;
        drop(accounts);

        tracing::info!(account = %account.id, name = %account.name, "account created");
        self.activate(account.id.as_str());
        self.notifier
            .notify(Notice::success(NoticeKind::AccountCreated, &account.id));
        Ok(account)
    }

    /// Rename an account
    ///
    /// Returns `false` without changes for a blank name or unknown id.
    ///
    /// # Errors
    /// Propagates storage write failures.
    pub fn rename_account(&self, id: &str, name: &str) -> Result<bool, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!(account = id, "ignoring blank rename");
            return Ok(false);
        }

        let mut accounts = self.accounts.lock();
        *accounts = load_registry(&self.storage)?;
        let Some(pos) = accounts.iter().position(|a| a.id == *id) else {
            tracing::debug!(account = id, "rename of unknown account ignored");
            return Ok(false);
        };

        let mut next = accounts.clone();
        next[pos].name = name.to_string();
        self.persist(&next, &self.storage.active_account())?;
        let renamed = next[pos].id.clone();
        *accounts = next;
        drop(accounts);

        self.notifier
            .notify(Notice::success(NoticeKind::AccountRenamed, &renamed));
        Ok(true)
    }

    /// Delete an account from the registry
    ///
    /// If it was active, the first remaining account becomes active (and its
    /// `last_active_at` is refreshed), or the sentinel when none remain.
    /// Entries already stored under the deleted account's namespace are left
    /// in place.
    ///
    /// # Errors
    /// Propagates storage write failures.
    pub fn delete_account(&self, id: &str) -> Result<bool, AccountError> {
        let mut accounts = self.accounts.lock();
        *accounts = load_registry(&self.storage)?;
        let Some(pos) = accounts.iter().position(|a| a.id == *id) else {
            tracing::debug!(account = id, "delete of unknown account ignored");
            return Ok(false);
        };

        let mut next = accounts.clone();
        let removed = next.remove(pos);

        let current = self.storage.active_account();
        let active = if current == id {
            match next.first_mut() {
                Some(elected) => {
                    elected.touch();
                    elected.id.to_string()
                }
                None => self.default_account.clone(),
            }
        } else {
            current.clone()
        };

        self.persist(&next, &active)?;
        *accounts = next;
        drop(accounts);

        tracing::info!(account = %removed.id, "account deleted");
        if active != current {
            self.activate(&active);
        }
        self.notifier
            .notify(Notice::success(NoticeKind::AccountDeleted, &removed.id));
        Ok(true)
    }

    /// Make `id` the active account
    ///
    /// An unknown id raises an error notice and changes nothing
    /// (`Ok(false)`). Otherwise the account's `last_active_at` is refreshed,
    /// the pointer persisted and an [`AccountChanged`] event broadcast.
    ///
    /// # Errors
    /// Propagates storage write failures.
    pub fn switch_account(&self, id: &str) -> Result<bool, AccountError> {
        let mut accounts = self.accounts.lock();
        *accounts = load_registry(&self.storage)?;
        let Some(pos) = accounts.iter().position(|a| a.id == *id) else {
            drop(accounts);
            tracing::warn!(account = id, "switch to unknown account refused");
            self.notifier
                .notify(Notice::error(NoticeKind::UnknownAccount, &AccountId::from(id)));
            return Ok(false);
        };

        let mut next = accounts.clone();
        next[pos].touch();
        self.persist(&next, id)?;
        let switched = next[pos].id.clone();
        *accounts = next;
        drop(accounts);

        self.activate(id);
        self.notifier
            .notify(Notice::success(NoticeKind::AccountSwitched, &switched));
        Ok(true)
    }

    /// Reload the cached registry from storage
    ///
    /// # Errors
    /// Propagates storage read failures.
    pub fn refresh(&self) -> Result<(), AccountError> {
        let mut accounts = self.accounts.lock();
        *accounts = load_registry(&self.storage)?;
        Ok(())
    }

    /// Accounts in registry order (newest-created first)
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.lock().clone()
    }

    /// Accounts sorted by most recently active first
    #[must_use]
    pub fn accounts_by_recent(&self) -> Vec<Account> {
        let mut accounts = self.accounts();
        accounts.sort_by(|a, b| b.last_active_at.cmp(&a.last_active_at));
        accounts
    }

    /// Look up an account
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Account> {
        self.accounts.lock().iter().find(|a| a.id == *id).cloned()
    }

    /// Active account id (the sentinel when none is selected)
    #[must_use]
    pub fn active_account_id(&self) -> String {
        self.storage.active_account()
    }

    /// Active account record, if the active id is a registered account
    #[must_use]
    pub fn active_account(&self) -> Option<Account> {
        self.get(&self.storage.active_account())
    }

    /// Check if the sentinel account is active
    #[must_use]
    pub fn is_default_active(&self) -> bool {
        self.storage.active_account() == self.default_account
    }

    /// Number of registered accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.lock().len()
    }

    /// Check if no account is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.lock().is_empty()
    }

    /// Subscribe to account-changed events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccountChanged> {
        self.events.subscribe()
    }

    /// Shared storage gateway
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &Arc<ScopedStorage> {
        &self.storage
    }

    fn persist(&self, accounts: &[Account], active: &str) -> Result<(), AccountError> {
        self.storage.set_json(ACCOUNTS_KEY, accounts)?;
        self.storage.set(ACTIVE_ACCOUNT_KEY, active)?;
        Ok(())
    }

    fn activate(&self, id: &str) {
        self.storage.set_active_account(id);
        self.events.publish(id);
    }
}

fn load_registry(storage: &ScopedStorage) -> Result<Vec<Account>, AccountError> {
    let Some(raw) = storage.get(ACCOUNTS_KEY)? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "account registry unreadable, starting empty");
        Vec::new()
    }))
}
