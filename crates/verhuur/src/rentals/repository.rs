use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::billing::{Invoice, InvoiceId};
use super::deposits::{Deposit, DepositId};
use super::leases::{Lease, LeaseId};
use super::tickets::{Changelog, ChangelogId, Issue, IssueId};

/// The entity families the back office persists and reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lease,
    Issue,
    Changelog,
    Invoice,
    Deposit,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lease => "lease",
            Self::Issue => "issue",
            Self::Changelog => "changelog",
            Self::Invoice => "invoice",
            Self::Deposit => "deposit",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error enumeration for repository failures.
///
/// Write conflicts from the backing store surface unchanged; the caller owns
/// any retry of the whole read-modify-write sequence.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations must give each update at-least single-row atomicity so two
/// concurrent transitions on the same entity serialize rather than interleave.
pub trait RentalRepository: Send + Sync {
    fn insert_lease(&self, lease: Lease) -> Result<Lease, RepositoryError>;
    fn update_lease(&self, lease: Lease) -> Result<(), RepositoryError>;
    fn fetch_lease(&self, id: &LeaseId) -> Result<Option<Lease>, RepositoryError>;

    fn insert_issue(&self, issue: Issue) -> Result<Issue, RepositoryError>;
    fn update_issue(&self, issue: Issue) -> Result<(), RepositoryError>;
    fn fetch_issue(&self, id: &IssueId) -> Result<Option<Issue>, RepositoryError>;

    fn insert_changelog(&self, changelog: Changelog) -> Result<Changelog, RepositoryError>;
    fn update_changelog(&self, changelog: Changelog) -> Result<(), RepositoryError>;
    fn fetch_changelog(&self, id: &ChangelogId) -> Result<Option<Changelog>, RepositoryError>;

    fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;
    fn update_invoice(&self, invoice: Invoice) -> Result<(), RepositoryError>;
    fn fetch_invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError>;

    fn insert_deposit(&self, deposit: Deposit) -> Result<Deposit, RepositoryError>;
    fn update_deposit(&self, deposit: Deposit) -> Result<(), RepositoryError>;
    fn fetch_deposit(&self, id: &DepositId) -> Result<Option<Deposit>, RepositoryError>;
}

/// Audit payload published after every persisted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionNotice {
    pub entity: EntityKind,
    pub entity_id: String,
    pub from: &'static str,
    pub to: &'static str,
    pub occurred_at: DateTime<Utc>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Trait describing outbound audit/notification hooks (mail, activity log).
///
/// Publishing is fire-and-forget from the service's point of view: a failed
/// publish never rolls back or fails the transition it reports on.
pub trait TransitionNotifier: Send + Sync {
    fn publish(&self, notice: TransitionNotice) -> Result<(), NotifyError>;
}
