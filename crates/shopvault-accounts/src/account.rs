//! Account data model
//!
//! Records are persisted as a JSON array under the `local_accounts` key,
//! newest-created first, with camelCase field names and ISO-8601 timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque, stable account identifier
///
/// Generated ids look like `acc_01j9z3...`: a ULID (millisecond timestamp
/// plus random bits) rendered in lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Generate a fresh id
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("acc_{}", Ulid::new().to_string().to_lowercase()))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AccountId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A local company account (tenant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Immutable identifier
    pub id: AccountId,
    /// Display label
    pub name: String,
    /// Creation time, immutable
    pub created_at: DateTime<Utc>,
    /// Last time this account became active
    pub last_active_at: DateTime<Utc>,
}

impl Account {
    /// Create account with a fresh id, created and active now
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(AccountId::generate(), name)
    }

    /// Create account with a known id, created and active now
    #[must_use]
    pub fn with_id(id: AccountId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Record that the account became active now
    #[inline]
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}
