use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::rentals::billing::{BillingConfig, Invoice, InvoiceId};
use crate::rentals::deposits::{Deposit, DepositId};
use crate::rentals::leases::{Lease, LeaseId};
use crate::rentals::policy::{Actor, ActorRole, AllowAll};
use crate::rentals::repository::{
    NotifyError, RentalRepository, RepositoryError, TransitionNotice, TransitionNotifier,
};
use crate::rentals::service::BackOffice;
use crate::rentals::tickets::{Changelog, ChangelogId, Issue, IssueId};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).single().expect("valid timestamp")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn admin() -> Actor {
    Actor::new("beheer", ActorRole::Administrator)
}

pub(super) fn staff() -> Actor {
    Actor::new("balie", ActorRole::BackOffice)
}

pub(super) fn tenant() -> Actor {
    Actor::new("huurder", ActorRole::Tenant)
}

pub(super) fn sample_lease() -> Lease {
    Lease::request(
        LeaseId("lease-test".to_string()),
        "J. Jansen".to_string(),
        date(2025, 7, 12),
        date(2025, 7, 14),
        now(),
    )
}

pub(super) fn euros(whole: i64, cents: u32) -> Decimal {
    Decimal::new(whole * 100 + i64::from(cents), 2)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    leases: Arc<Mutex<HashMap<LeaseId, Lease>>>,
    issues: Arc<Mutex<HashMap<IssueId, Issue>>>,
    changelogs: Arc<Mutex<HashMap<ChangelogId, Changelog>>>,
    invoices: Arc<Mutex<HashMap<InvoiceId, Invoice>>>,
    deposits: Arc<Mutex<HashMap<DepositId, Deposit>>>,
}

macro_rules! memory_repo_entity {
    ($field:ident, $insert:ident, $update:ident, $fetch:ident, $entity:ty, $id:ty) => {
        fn $insert(&self, entity: $entity) -> Result<$entity, RepositoryError> {
            let mut guard = self.$field.lock().expect("lock");
            if guard.contains_key(&entity.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(entity.id.clone(), entity.clone());
            Ok(entity)
        }

        fn $update(&self, entity: $entity) -> Result<(), RepositoryError> {
            let mut guard = self.$field.lock().expect("lock");
            if guard.contains_key(&entity.id) {
                guard.insert(entity.id.clone(), entity);
                Ok(())
            } else {
                Err(RepositoryError::NotFound)
            }
        }

        fn $fetch(&self, id: &$id) -> Result<Option<$entity>, RepositoryError> {
            let guard = self.$field.lock().expect("lock");
            Ok(guard.get(id).cloned())
        }
    };
}

impl RentalRepository for MemoryRepository {
    memory_repo_entity!(leases, insert_lease, update_lease, fetch_lease, Lease, LeaseId);
    memory_repo_entity!(issues, insert_issue, update_issue, fetch_issue, Issue, IssueId);
    memory_repo_entity!(
        changelogs,
        insert_changelog,
        update_changelog,
        fetch_changelog,
        Changelog,
        ChangelogId
    );
    memory_repo_entity!(
        invoices,
        insert_invoice,
        update_invoice,
        fetch_invoice,
        Invoice,
        InvoiceId
    );
    memory_repo_entity!(
        deposits,
        insert_deposit,
        update_deposit,
        fetch_deposit,
        Deposit,
        DepositId
    );
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<TransitionNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<TransitionNotice> {
        self.notices.lock().expect("lock").clone()
    }
}

impl TransitionNotifier for MemoryNotifier {
    fn publish(&self, notice: TransitionNotice) -> Result<(), NotifyError> {
        self.notices.lock().expect("lock").push(notice);
        Ok(())
    }
}

/// Notifier whose transport always fails, to prove publishes are not awaited.
#[derive(Default, Clone)]
pub(super) struct BrokenNotifier;

impl TransitionNotifier for BrokenNotifier {
    fn publish(&self, _notice: TransitionNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp down".to_string()))
    }
}

pub(super) fn build_back_office() -> (
    BackOffice<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = BackOffice::new(
        repository.clone(),
        notifier.clone(),
        Arc::new(AllowAll),
        BillingConfig::default(),
    );
    (service, repository, notifier)
}
