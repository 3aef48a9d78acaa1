use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use super::billing::{BillingConfig, Invoice, InvoiceId, InvoiceStatus};
use super::deposits::{Deposit, DepositError, DepositId};
use super::leases::{Lease, LeaseId, LeaseStatus};
use super::machine::TransitionError;
use super::policy::{Actor, TransitionPolicy};
use super::repository::{
    EntityKind, NotifyError, RentalRepository, RepositoryError, TransitionNotice,
    TransitionNotifier,
};
use super::tickets::{Changelog, ChangelogError, ChangelogId, Issue, IssueError, IssueId};

/// Back-office facade: loads an entity, checks the caller's permission,
/// applies the requested transition, saves, and publishes an audit notice.
///
/// Transitions are synchronous and never retried here; persistence conflicts
/// propagate unchanged so the caller can redo the whole read-modify-write.
pub struct BackOffice<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    policy: Arc<dyn TransitionPolicy>,
    billing: BillingConfig,
    sequences: IdSequences,
}

/// Per-instance counters seeding candidate identifiers; the repository has
/// the final say, since a durable store may already hold rows from earlier
/// runs of the service.
#[derive(Default)]
struct IdSequences {
    leases: AtomicU64,
    issues: AtomicU64,
    changelogs: AtomicU64,
    invoices: AtomicU64,
    deposits: AtomicU64,
}

fn next_id(sequence: &AtomicU64, prefix: &str) -> String {
    let id = sequence.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{prefix}-{id:06}")
}

/// Insert a new row under a freshly allocated identifier. A `Conflict` means
/// the candidate is already taken, so the sequence advances and tries again;
/// every other outcome is final.
fn insert_fresh<T>(
    sequence: &AtomicU64,
    prefix: &str,
    mut insert: impl FnMut(String) -> Result<T, RepositoryError>,
) -> Result<T, RepositoryError> {
    loop {
        match insert(next_id(sequence, prefix)) {
            Err(RepositoryError::Conflict) => continue,
            result => return result,
        }
    }
}

/// Error raised by the back-office service.
#[derive(Debug, thiserror::Error)]
pub enum BackOfficeError {
    /// The policy denied the transition; distinct from any graph violation.
    #[error("{actor} may not move the {entity} to {target}")]
    Forbidden {
        actor: String,
        entity: EntityKind,
        target: &'static str,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Lease(#[from] TransitionError<LeaseStatus>),
    #[error(transparent)]
    Invoice(#[from] TransitionError<InvoiceStatus>),
    #[error(transparent)]
    Issue(#[from] IssueError),
    #[error(transparent)]
    Changelog(#[from] ChangelogError),
    #[error(transparent)]
    Deposit(#[from] DepositError),
}

impl<R, N> BackOffice<R, N>
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        policy: Arc<dyn TransitionPolicy>,
        billing: BillingConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            policy,
            billing,
            sequences: IdSequences::default(),
        }
    }

    // ── Leases ──────────────────────────────────────────────────────

    /// Register a new booking request.
    pub fn register_lease(
        &self,
        tenant: String,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<Lease, BackOfficeError> {
        let now = Utc::now();
        let lease = insert_fresh(&self.sequences.leases, "lease", |id| {
            self.repository.insert_lease(Lease::request(
                LeaseId(id),
                tenant.clone(),
                starts_on,
                ends_on,
                now,
            ))
        })?;
        Ok(lease)
    }

    pub fn lease(&self, id: &LeaseId) -> Result<Lease, BackOfficeError> {
        Ok(self
            .repository
            .fetch_lease(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn quote_lease(&self, actor: &Actor, id: &LeaseId) -> Result<Lease, BackOfficeError> {
        self.apply_lease(actor, id, LeaseStatus::Quotation, |lease, now| {
            lease.quote(now)
        })
    }

    pub fn option_lease(&self, actor: &Actor, id: &LeaseId) -> Result<Lease, BackOfficeError> {
        self.apply_lease(actor, id, LeaseStatus::Option, |lease, now| {
            lease.place_option(now)
        })
    }

    pub fn confirm_lease(&self, actor: &Actor, id: &LeaseId) -> Result<Lease, BackOfficeError> {
        self.apply_lease(actor, id, LeaseStatus::Confirmed, |lease, now| {
            lease.confirm(now)
        })
    }

    pub fn finalize_lease(&self, actor: &Actor, id: &LeaseId) -> Result<Lease, BackOfficeError> {
        self.apply_lease(actor, id, LeaseStatus::Finalized, |lease, now| {
            lease.finalize(now)
        })
    }

    pub fn cancel_lease(
        &self,
        actor: &Actor,
        id: &LeaseId,
        reason: Option<String>,
    ) -> Result<Lease, BackOfficeError> {
        self.apply_lease(actor, id, LeaseStatus::Cancelled, |lease, now| {
            lease.cancel(reason, now)
        })
    }

    fn apply_lease<F>(
        &self,
        actor: &Actor,
        id: &LeaseId,
        target: LeaseStatus,
        transition: F,
    ) -> Result<Lease, BackOfficeError>
    where
        F: FnOnce(&mut Lease, DateTime<Utc>) -> Result<(), TransitionError<LeaseStatus>>,
    {
        let mut lease = self.lease(id)?;
        self.authorize(actor, EntityKind::Lease, target.label())?;
        let now = Utc::now();
        let from = lease.status;
        transition(&mut lease, now)?;
        self.repository.update_lease(lease.clone())?;
        self.notify(EntityKind::Lease, &lease.id.0, from.label(), lease.status.label(), now);
        Ok(lease)
    }

    // ── Issues and changelogs ───────────────────────────────────────

    /// Register a new issue ticket.
    pub fn report_issue(
        &self,
        summary: String,
        reported_by: String,
    ) -> Result<Issue, BackOfficeError> {
        let issue = insert_fresh(&self.sequences.issues, "issue", |id| {
            self.repository
                .insert_issue(Issue::open(IssueId(id), summary.clone(), reported_by.clone()))
        })?;
        Ok(issue)
    }

    pub fn issue(&self, id: &IssueId) -> Result<Issue, BackOfficeError> {
        Ok(self
            .repository
            .fetch_issue(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn close_issue(&self, actor: &Actor, id: &IssueId) -> Result<Issue, BackOfficeError> {
        self.apply_issue(actor, id, "closed", |issue, now| issue.close(now))
    }

    pub fn reopen_issue(&self, actor: &Actor, id: &IssueId) -> Result<Issue, BackOfficeError> {
        self.apply_issue(actor, id, "open", |issue, _| issue.reopen())
    }

    fn apply_issue<F>(
        &self,
        actor: &Actor,
        id: &IssueId,
        target: &'static str,
        transition: F,
    ) -> Result<Issue, BackOfficeError>
    where
        F: FnOnce(&mut Issue, DateTime<Utc>) -> Result<(), IssueError>,
    {
        let mut issue = self.issue(id)?;
        self.authorize(actor, EntityKind::Issue, target)?;
        let now = Utc::now();
        let from = issue.status;
        transition(&mut issue, now)?;
        self.repository.update_issue(issue.clone())?;
        self.notify(EntityKind::Issue, &issue.id.0, from.label(), issue.status.label(), now);
        Ok(issue)
    }

    /// Register a new changelog entry.
    pub fn record_changelog(&self, title: String) -> Result<Changelog, BackOfficeError> {
        let changelog = insert_fresh(&self.sequences.changelogs, "changelog", |id| {
            self.repository
                .insert_changelog(Changelog::open(ChangelogId(id), title.clone()))
        })?;
        Ok(changelog)
    }

    pub fn changelog(&self, id: &ChangelogId) -> Result<Changelog, BackOfficeError> {
        Ok(self
            .repository
            .fetch_changelog(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn close_changelog(
        &self,
        actor: &Actor,
        id: &ChangelogId,
    ) -> Result<Changelog, BackOfficeError> {
        self.apply_changelog(actor, id, "closed", |entry, now| entry.close(now))
    }

    pub fn reopen_changelog(
        &self,
        actor: &Actor,
        id: &ChangelogId,
    ) -> Result<Changelog, BackOfficeError> {
        self.apply_changelog(actor, id, "open", |entry, _| entry.reopen())
    }

    fn apply_changelog<F>(
        &self,
        actor: &Actor,
        id: &ChangelogId,
        target: &'static str,
        transition: F,
    ) -> Result<Changelog, BackOfficeError>
    where
        F: FnOnce(&mut Changelog, DateTime<Utc>) -> Result<(), ChangelogError>,
    {
        let mut entry = self.changelog(id)?;
        self.authorize(actor, EntityKind::Changelog, target)?;
        let now = Utc::now();
        let from = entry.status;
        transition(&mut entry, now)?;
        self.repository.update_changelog(entry.clone())?;
        self.notify(EntityKind::Changelog, &entry.id.0, from.label(), entry.status.label(), now);
        Ok(entry)
    }

    // ── Invoices and quotations ─────────────────────────────────────

    /// Draft a plain invoice for a lease.
    pub fn draft_invoice(
        &self,
        lease_id: LeaseId,
        amount: Decimal,
    ) -> Result<Invoice, BackOfficeError> {
        let now = Utc::now();
        let invoice = insert_fresh(&self.sequences.invoices, "invoice", |id| {
            self.repository
                .insert_invoice(Invoice::draft(InvoiceId(id), lease_id.clone(), amount, now))
        })?;
        Ok(invoice)
    }

    /// Register a quotation request for a prospective tenant.
    pub fn request_quotation(
        &self,
        lease_id: LeaseId,
        amount: Decimal,
    ) -> Result<Invoice, BackOfficeError> {
        let now = Utc::now();
        let invoice = insert_fresh(&self.sequences.invoices, "invoice", |id| {
            self.repository.insert_invoice(Invoice::quotation_request(
                InvoiceId(id),
                lease_id.clone(),
                amount,
                now,
            ))
        })?;
        Ok(invoice)
    }

    pub fn invoice(&self, id: &InvoiceId) -> Result<Invoice, BackOfficeError> {
        Ok(self
            .repository
            .fetch_invoice(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn send_quotation(&self, actor: &Actor, id: &InvoiceId) -> Result<Invoice, BackOfficeError> {
        self.apply_invoice(actor, id, InvoiceStatus::Quotation, |invoice, now, _| {
            invoice.send_quotation(now)
        })
    }

    pub fn decline_quotation(
        &self,
        actor: &Actor,
        id: &InvoiceId,
    ) -> Result<Invoice, BackOfficeError> {
        self.apply_invoice(
            actor,
            id,
            InvoiceStatus::QuotationDeclined,
            |invoice, now, _| invoice.decline_quotation(now),
        )
    }

    /// Open the document for payment: accepts a sent quotation or issues a
    /// drafted invoice, depending on where it currently stands. Either way
    /// the payment deadline comes from the billing configuration.
    pub fn open_invoice(&self, actor: &Actor, id: &InvoiceId) -> Result<Invoice, BackOfficeError> {
        self.apply_invoice(actor, id, InvoiceStatus::Open, |invoice, now, billing| {
            let due_at = billing.due_from(now);
            if invoice.status == InvoiceStatus::Quotation {
                invoice.accept_quotation(now, due_at)
            } else {
                invoice.issue(now, due_at)
            }
        })
    }

    pub fn mark_invoice_paid(
        &self,
        actor: &Actor,
        id: &InvoiceId,
    ) -> Result<Invoice, BackOfficeError> {
        self.apply_invoice(actor, id, InvoiceStatus::Paid, |invoice, now, _| {
            invoice.mark_paid(now)
        })
    }

    pub fn mark_invoice_void(
        &self,
        actor: &Actor,
        id: &InvoiceId,
    ) -> Result<Invoice, BackOfficeError> {
        self.apply_invoice(actor, id, InvoiceStatus::Void, |invoice, now, _| {
            invoice.mark_void(now)
        })
    }

    pub fn mark_invoice_uncollected(
        &self,
        actor: &Actor,
        id: &InvoiceId,
    ) -> Result<Invoice, BackOfficeError> {
        self.apply_invoice(actor, id, InvoiceStatus::Uncollected, |invoice, now, _| {
            invoice.mark_uncollected(now)
        })
    }

    fn apply_invoice<F>(
        &self,
        actor: &Actor,
        id: &InvoiceId,
        target: InvoiceStatus,
        transition: F,
    ) -> Result<Invoice, BackOfficeError>
    where
        F: FnOnce(
            &mut Invoice,
            DateTime<Utc>,
            &BillingConfig,
        ) -> Result<(), TransitionError<InvoiceStatus>>,
    {
        let mut invoice = self.invoice(id)?;
        self.authorize(actor, EntityKind::Invoice, target.label())?;
        let now = Utc::now();
        let from = invoice.status;
        transition(&mut invoice, now, &self.billing)?;
        self.repository.update_invoice(invoice.clone())?;
        self.notify(
            EntityKind::Invoice,
            &invoice.id.0,
            from.label(),
            invoice.status.label(),
            now,
        );
        Ok(invoice)
    }

    // ── Deposits ────────────────────────────────────────────────────

    /// Register a deposit the tenant has paid for a lease.
    pub fn register_deposit(
        &self,
        lease_id: LeaseId,
        paid_amount: Decimal,
    ) -> Result<Deposit, BackOfficeError> {
        let now = Utc::now();
        let deposit = insert_fresh(&self.sequences.deposits, "deposit", |id| {
            self.repository.insert_deposit(Deposit::paid(
                DepositId(id),
                lease_id.clone(),
                paid_amount,
                now,
            ))
        })?;
        Ok(deposit)
    }

    pub fn deposit(&self, id: &DepositId) -> Result<Deposit, BackOfficeError> {
        Ok(self
            .repository
            .fetch_deposit(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    /// Settle a paid deposit, withholding `revoked` and refunding the rest.
    pub fn settle_deposit(
        &self,
        actor: &Actor,
        id: &DepositId,
        revoked: Decimal,
    ) -> Result<Deposit, BackOfficeError> {
        let mut deposit = self.deposit(id)?;
        self.authorize(actor, EntityKind::Deposit, "settled")?;
        let now = Utc::now();
        let from = deposit.status;
        deposit.settle(revoked, now)?;
        self.repository.update_deposit(deposit.clone())?;
        self.notify(
            EntityKind::Deposit,
            &deposit.id.0,
            from.label(),
            deposit.status.label(),
            now,
        );
        Ok(deposit)
    }

    // ── Shared plumbing ─────────────────────────────────────────────

    fn authorize(
        &self,
        actor: &Actor,
        entity: EntityKind,
        target: &'static str,
    ) -> Result<(), BackOfficeError> {
        if self.policy.can_transition(actor, entity, target) {
            Ok(())
        } else {
            Err(BackOfficeError::Forbidden {
                actor: actor.to_string(),
                entity,
                target,
            })
        }
    }

    fn notify(
        &self,
        entity: EntityKind,
        entity_id: &str,
        from: &'static str,
        to: &'static str,
        occurred_at: DateTime<Utc>,
    ) {
        let notice = TransitionNotice {
            entity,
            entity_id: entity_id.to_string(),
            from,
            to,
            occurred_at,
        };
        if let Err(NotifyError::Transport(detail)) = self.notifier.publish(notice) {
            warn!(%entity, entity_id, from, to, detail, "transition notice dropped");
        }
    }
}
