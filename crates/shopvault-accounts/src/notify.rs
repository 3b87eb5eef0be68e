//! Notifications and the account-changed broadcast
//!
//! Two channels leave the account manager:
//! - [`Notice`]s for the user (success / warning / error toasts), delivered
//!   through a [`Notifier`]
//! - [`AccountChanged`] events on a process-wide broadcast, for listeners
//!   that reload their data when the active namespace moves

use crate::account::AccountId;
use parking_lot::Mutex;
use tokio::sync::broadcast;

/// Default capacity of the account-changed channel
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Input was adjusted
    Warning,
    /// Operation was refused
    Error,
}

/// What a notice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// New account created
    AccountCreated,
    /// Account renamed
    AccountRenamed,
    /// Account deleted
    AccountDeleted,
    /// Active account changed
    AccountSwitched,
    /// Blank name replaced by the placeholder
    EmptyName,
    /// Requested account does not exist
    UnknownAccount,
}

/// User-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Subject
    pub kind: NoticeKind,
    /// Account concerned, if any
    pub account_id: Option<AccountId>,
}

impl Notice {
    /// Success notice about `account`
    #[inline]
    #[must_use]
    pub fn success(kind: NoticeKind, account: &AccountId) -> Self {
        Self {
            level: NoticeLevel::Success,
            kind,
            account_id: Some(account.clone()),
        }
    }

    /// Warning notice
    #[inline]
    #[must_use]
    pub fn warning(kind: NoticeKind) -> Self {
        Self {
            level: NoticeLevel::Warning,
            kind,
            account_id: None,
        }
    }

    /// Error notice about `account`
    #[inline]
    #[must_use]
    pub fn error(kind: NoticeKind, account: &AccountId) -> Self {
        Self {
            level: NoticeLevel::Error,
            kind,
            account_id: Some(account.clone()),
        }
    }

    /// Default English text
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self.kind {
            NoticeKind::AccountCreated => "Account created",
            NoticeKind::AccountRenamed => "Account renamed",
            NoticeKind::AccountDeleted => "Account deleted",
            NoticeKind::AccountSwitched => "Switched account",
            NoticeKind::EmptyName => "Account name is empty, using a default name",
            NoticeKind::UnknownAccount => "Account not found",
        }
    }
}

/// Sink for user-facing notices
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Deliver a notice
    fn notify(&self, notice: Notice);
}

/// Notifier writing notices to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let account = notice.account_id.as_ref().map_or("-", AccountId::as_str);
        match notice.level {
            NoticeLevel::Success => tracing::info!(kind = ?notice.kind, account, "{}", notice.message()),
            NoticeLevel::Warning => tracing::warn!(kind = ?notice.kind, account, "{}", notice.message()),
            NoticeLevel::Error => tracing::error!(kind = ?notice.kind, account, "{}", notice.message()),
        }
    }
}

/// Notifier collecting notices in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Create empty recorder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Remove and return notices received so far
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    /// Most recent notice
    #[must_use]
    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Broadcast payload: the active account changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChanged {
    /// Newly active account (or the sentinel id)
    pub account_id: String,
}

/// Process-wide account-changed channel
///
/// Clones share one channel. Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct AccountEvents {
    sender: broadcast::Sender<AccountChanged>,
}

impl AccountEvents {
    /// Create channel buffering up to `capacity` events per slow subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccountChanged> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, account_id: impl Into<String>) -> usize {
        let event = AccountChanged {
            account_id: account_id.into(),
        };
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(account = %event.account_id, "account change with no listeners");
                0
            }
        }
    }

    /// Number of live subscribers
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AccountEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
