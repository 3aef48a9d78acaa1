use std::sync::Arc;

use super::common::*;
use crate::rentals::billing::{BillingConfig, InvoiceStatus};
use crate::rentals::deposits::DepositStatus;
use crate::rentals::leases::{Lease, LeaseId, LeaseStatus};
use crate::rentals::machine::TransitionError;
use crate::rentals::policy::RoleMatrix;
use crate::rentals::repository::{EntityKind, RentalRepository, RepositoryError};
use crate::rentals::service::{BackOffice, BackOfficeError};
use crate::rentals::tickets::TicketStatus;

#[test]
fn registered_lease_is_persisted_in_its_initial_state() {
    let (service, repository, _) = build_back_office();
    let lease = service
        .register_lease("J. Jansen".to_string(), date(2025, 7, 12), date(2025, 7, 14))
        .expect("lease registered");

    let stored = repository
        .fetch_lease(&lease.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, LeaseStatus::Request);
}

#[test]
fn id_allocation_skips_rows_surviving_a_restart() {
    let (service, repository, _) = build_back_office();
    // A durable store may still hold rows from an earlier run of the service.
    let occupied = Lease::request(
        LeaseId("lease-000001".to_string()),
        "Bezette rij".to_string(),
        date(2025, 7, 1),
        date(2025, 7, 2),
        now(),
    );
    repository.insert_lease(occupied).expect("seeded row");

    let lease = service
        .register_lease("J. Jansen".to_string(), date(2025, 7, 12), date(2025, 7, 14))
        .expect("registration allocates past occupied identifiers");
    assert_ne!(lease.id.0, "lease-000001");

    let stored = repository
        .fetch_lease(&lease.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, LeaseStatus::Request);
}

#[test]
fn confirmed_transition_is_persisted_and_announced() {
    let (service, repository, notifier) = build_back_office();
    let lease = service
        .register_lease("J. Jansen".to_string(), date(2025, 7, 12), date(2025, 7, 14))
        .expect("lease registered");
    service
        .option_lease(&staff(), &lease.id)
        .expect("request can be optioned");
    service
        .confirm_lease(&staff(), &lease.id)
        .expect("option can be confirmed");

    let stored = repository
        .fetch_lease(&lease.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, LeaseStatus::Confirmed);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[1].entity, EntityKind::Lease);
    assert_eq!(notices[1].from, "option");
    assert_eq!(notices[1].to, "confirmed");
}

#[test]
fn invalid_edge_is_reported_and_nothing_is_saved() {
    let (service, repository, notifier) = build_back_office();
    let lease = service
        .register_lease("J. Jansen".to_string(), date(2025, 7, 12), date(2025, 7, 14))
        .expect("lease registered");

    match service.confirm_lease(&staff(), &lease.id) {
        Err(BackOfficeError::Lease(TransitionError::NotAllowed { from, to })) => {
            assert_eq!(from, LeaseStatus::Request);
            assert_eq!(to, LeaseStatus::Confirmed);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    let stored = repository
        .fetch_lease(&lease.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, LeaseStatus::Request);
    assert!(notifier.notices().is_empty(), "failed transitions announce nothing");
}

#[test]
fn missing_lease_propagates_not_found() {
    let (service, _, _) = build_back_office();
    match service.confirm_lease(&staff(), &LeaseId("missing".to_string())) {
        Err(BackOfficeError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn role_matrix_blocks_financial_terminals_for_staff() {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = BackOffice::new(
        repository,
        notifier.clone(),
        Arc::new(RoleMatrix),
        BillingConfig::default(),
    );

    let lease = service
        .register_lease("J. Jansen".to_string(), date(2025, 7, 12), date(2025, 7, 14))
        .expect("lease registered");
    let invoice = service
        .draft_invoice(lease.id.clone(), euros(450, 0))
        .expect("invoice drafted");
    service
        .open_invoice(&staff(), &invoice.id)
        .expect("staff may issue invoices");

    match service.mark_invoice_paid(&staff(), &invoice.id) {
        Err(BackOfficeError::Forbidden { entity, target, .. }) => {
            assert_eq!(entity, EntityKind::Invoice);
            assert_eq!(target, "paid");
        }
        other => panic!("expected forbidden, got {other:?}"),
    }

    // A permission failure must stay distinguishable from a graph failure.
    service
        .mark_invoice_paid(&admin(), &invoice.id)
        .expect("administrators settle invoices");

    match service.mark_invoice_paid(&admin(), &invoice.id) {
        Err(BackOfficeError::Invoice(TransitionError::Terminal { .. })) => {}
        other => panic!("expected terminal state error, got {other:?}"),
    }
}

#[test]
fn tenants_cannot_transition_anything() {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = BackOffice::new(
        repository,
        notifier,
        Arc::new(RoleMatrix),
        BillingConfig::default(),
    );

    let issue = service
        .report_issue("lekkage".to_string(), "huurder".to_string())
        .expect("issue reported");
    match service.close_issue(&tenant(), &issue.id) {
        Err(BackOfficeError::Forbidden { .. }) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn broken_notifier_does_not_fail_the_transition() {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(BrokenNotifier);
    let service = BackOffice::new(
        repository.clone(),
        notifier,
        Arc::new(crate::rentals::policy::AllowAll),
        BillingConfig::default(),
    );

    let issue = service
        .report_issue("lekkage".to_string(), "huurder".to_string())
        .expect("issue reported");
    let closed = service
        .close_issue(&staff(), &issue.id)
        .expect("close succeeds despite the broken transport");
    assert_eq!(closed.status, TicketStatus::Closed);

    let stored = repository
        .fetch_issue(&issue.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, TicketStatus::Closed);
}

#[test]
fn open_invoice_dispatches_on_current_state() {
    let (service, _, _) = build_back_office();
    let lease_id = LeaseId("lease-billing".to_string());

    let drafted = service
        .draft_invoice(lease_id.clone(), euros(450, 0))
        .expect("draft created");
    let opened = service
        .open_invoice(&staff(), &drafted.id)
        .expect("draft issues");
    assert_eq!(opened.status, InvoiceStatus::Open);
    assert!(opened.due_at.is_some());

    let quoted = service
        .request_quotation(lease_id, euros(450, 0))
        .expect("quotation request created");
    let quoted = service
        .send_quotation(&staff(), &quoted.id)
        .expect("quotation sent");
    let accepted = service
        .open_invoice(&staff(), &quoted.id)
        .expect("quotation accepts");
    assert_eq!(accepted.status, InvoiceStatus::Open);
    assert!(accepted.due_at.is_some());
}

#[test]
fn deposit_settlement_round_trips_through_the_service() {
    let (service, repository, notifier) = build_back_office();
    let deposit = service
        .register_deposit(LeaseId("lease-deposit".to_string()), euros(250, 0))
        .expect("deposit registered");

    let settled = service
        .settle_deposit(&admin(), &deposit.id, euros(50, 0))
        .expect("settlement succeeds");
    assert_eq!(settled.status, DepositStatus::PartiallyRefunded);
    assert_eq!(settled.refunded_amount, Some(euros(200, 0)));

    let stored = repository
        .fetch_deposit(&deposit.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, settled);

    let notice = notifier.notices().pop().expect("settlement announced");
    assert_eq!(notice.entity, EntityKind::Deposit);
    assert_eq!(notice.from, "paid");
    assert_eq!(notice.to, "partially_refunded");
}
