//! Key namespacing rules
//!
//! A scoped key embeds the owning account: `acc:<account>:<key>`. Keys in
//! the [`GlobalKeySet`] are process identity or namespacing metadata and are
//! never rewritten.

use std::collections::HashSet;

/// Prefix marking a namespaced key
pub const DEFAULT_KEY_PREFIX: &str = "acc:";

/// Separator between account id and original key
pub const KEY_SEPARATOR: char = ':';

/// Registry of accounts (JSON array)
pub const ACCOUNTS_KEY: &str = "local_accounts";

/// Pointer to the active account id
pub const ACTIVE_ACCOUNT_KEY: &str = "active_account_id";

/// Keys shared by every account on the device
pub const DEFAULT_GLOBAL_KEYS: &[&str] = &[
    ACCOUNTS_KEY,
    ACTIVE_ACCOUNT_KEY,
    "auth_session",
    "auth_user",
    "device_id",
    "app_logo",
    "program_name",
    "dark_mode",
    "app_language",
];

/// Set of keys exempt from namespacing
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GlobalKeySet {
    keys: HashSet<String>,
}

impl GlobalKeySet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }

    /// Create set with the built-in global keys
    #[must_use]
    pub fn with_defaults() -> Self {
        DEFAULT_GLOBAL_KEYS.iter().copied().collect()
    }

    /// Add a key
    pub fn insert(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    /// Check if key is global
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of global keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sorted key names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<S: Into<String>> FromIterator<S> for GlobalKeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// How a requested key is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Empty key, global key, or a key already carrying the prefix
    Passthrough,
    /// Rewritten into the active account namespace
    Scoped,
}

/// Namespacing rules: reserved prefix plus the global key set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScope {
    prefix: String,
    globals: GlobalKeySet,
}

impl KeyScope {
    /// Create scope with a custom prefix and global set
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>, globals: GlobalKeySet) -> Self {
        Self {
            prefix: prefix.into(),
            globals,
        }
    }

    /// Reserved prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Global key set
    #[inline]
    #[must_use]
    pub fn globals(&self) -> &GlobalKeySet {
        &self.globals
    }

    /// Classify a requested key
    #[must_use]
    pub fn classify(&self, key: &str) -> KeyClass {
        if key.is_empty() || self.globals.contains(key) || key.starts_with(&self.prefix) {
            KeyClass::Passthrough
        } else {
            KeyClass::Scoped
        }
    }

    /// Build the namespaced form of `key` for `account`
    #[must_use]
    pub fn scoped_key(&self, account: &str, key: &str) -> String {
        let mut scoped =
            String::with_capacity(self.prefix.len() + account.len() + 1 + key.len());
        scoped.push_str(&self.prefix);
        scoped.push_str(account);
        scoped.push(KEY_SEPARATOR);
        scoped.push_str(key);
        scoped
    }

    /// Split a stored namespaced key into `(account, key)`
    ///
    /// Account ids never contain the separator, so the first separator
    /// after the prefix ends the account id.
    #[must_use]
    pub fn parse_scoped<'a>(&self, stored: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = stored.strip_prefix(self.prefix.as_str())?;
        let (account, key) = rest.split_once(KEY_SEPARATOR)?;
        if account.is_empty() || key.is_empty() {
            return None;
        }
        Some((account, key))
    }
}

impl Default for KeyScope {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX, GlobalKeySet::with_defaults())
    }
}
