use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;
use verhuur::rentals::billing::{Invoice, InvoiceId};
use verhuur::rentals::deposits::{Deposit, DepositId};
use verhuur::rentals::leases::{Lease, LeaseId};
use verhuur::rentals::repository::{
    NotifyError, RentalRepository, RepositoryError, TransitionNotice, TransitionNotifier,
};
use verhuur::rentals::tickets::{Changelog, ChangelogId, Issue, IssueId};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One map per entity behind its own lock, so a slow deposit settlement
/// never blocks lease traffic.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRentalRepository {
    leases: Arc<Mutex<HashMap<LeaseId, Lease>>>,
    issues: Arc<Mutex<HashMap<IssueId, Issue>>>,
    changelogs: Arc<Mutex<HashMap<ChangelogId, Changelog>>>,
    invoices: Arc<Mutex<HashMap<InvoiceId, Invoice>>>,
    deposits: Arc<Mutex<HashMap<DepositId, Deposit>>>,
}

fn insert_row<K, V>(rows: &Mutex<HashMap<K, V>>, key: K, value: V) -> Result<V, RepositoryError>
where
    K: Hash + Eq,
    V: Clone,
{
    let mut guard = rows.lock().expect("repository mutex poisoned");
    if guard.contains_key(&key) {
        return Err(RepositoryError::Conflict);
    }
    guard.insert(key, value.clone());
    Ok(value)
}

fn update_row<K, V>(rows: &Mutex<HashMap<K, V>>, key: K, value: V) -> Result<(), RepositoryError>
where
    K: Hash + Eq,
{
    let mut guard = rows.lock().expect("repository mutex poisoned");
    if guard.contains_key(&key) {
        guard.insert(key, value);
        Ok(())
    } else {
        Err(RepositoryError::NotFound)
    }
}

fn fetch_row<K, V>(rows: &Mutex<HashMap<K, V>>, key: &K) -> Result<Option<V>, RepositoryError>
where
    K: Hash + Eq,
    V: Clone,
{
    let guard = rows.lock().expect("repository mutex poisoned");
    Ok(guard.get(key).cloned())
}

impl RentalRepository for InMemoryRentalRepository {
    fn insert_lease(&self, lease: Lease) -> Result<Lease, RepositoryError> {
        insert_row(&self.leases, lease.id.clone(), lease)
    }

    fn update_lease(&self, lease: Lease) -> Result<(), RepositoryError> {
        update_row(&self.leases, lease.id.clone(), lease)
    }

    fn fetch_lease(&self, id: &LeaseId) -> Result<Option<Lease>, RepositoryError> {
        fetch_row(&self.leases, id)
    }

    fn insert_issue(&self, issue: Issue) -> Result<Issue, RepositoryError> {
        insert_row(&self.issues, issue.id.clone(), issue)
    }

    fn update_issue(&self, issue: Issue) -> Result<(), RepositoryError> {
        update_row(&self.issues, issue.id.clone(), issue)
    }

    fn fetch_issue(&self, id: &IssueId) -> Result<Option<Issue>, RepositoryError> {
        fetch_row(&self.issues, id)
    }

    fn insert_changelog(&self, changelog: Changelog) -> Result<Changelog, RepositoryError> {
        insert_row(&self.changelogs, changelog.id.clone(), changelog)
    }

    fn update_changelog(&self, changelog: Changelog) -> Result<(), RepositoryError> {
        update_row(&self.changelogs, changelog.id.clone(), changelog)
    }

    fn fetch_changelog(&self, id: &ChangelogId) -> Result<Option<Changelog>, RepositoryError> {
        fetch_row(&self.changelogs, id)
    }

    fn insert_invoice(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        insert_row(&self.invoices, invoice.id.clone(), invoice)
    }

    fn update_invoice(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        update_row(&self.invoices, invoice.id.clone(), invoice)
    }

    fn fetch_invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        fetch_row(&self.invoices, id)
    }

    fn insert_deposit(&self, deposit: Deposit) -> Result<Deposit, RepositoryError> {
        insert_row(&self.deposits, deposit.id.clone(), deposit)
    }

    fn update_deposit(&self, deposit: Deposit) -> Result<(), RepositoryError> {
        update_row(&self.deposits, deposit.id.clone(), deposit)
    }

    fn fetch_deposit(&self, id: &DepositId) -> Result<Option<Deposit>, RepositoryError> {
        fetch_row(&self.deposits, id)
    }
}

/// Audit-trail notifier: every committed transition lands in the log.
#[derive(Default, Clone)]
pub(crate) struct LogNotifier;

impl TransitionNotifier for LogNotifier {
    fn publish(&self, notice: TransitionNotice) -> Result<(), NotifyError> {
        info!(
            entity = %notice.entity,
            entity_id = %notice.entity_id,
            from = notice.from,
            to = notice.to,
            occurred_at = %notice.occurred_at,
            "status transition committed"
        );
        Ok(())
    }
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|err| format!("failed to parse '{raw}' as a decimal amount ({err})"))
}

pub(crate) fn parse_date(raw: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
