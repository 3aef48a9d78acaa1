use super::common::*;
use crate::rentals::deposits::{Deposit, DepositError, DepositId, DepositStatus};
use crate::rentals::leases::LeaseId;
use crate::rentals::machine::{StatusSet, TransitionError};
use rust_decimal::Decimal;

fn paid_deposit(amount: Decimal) -> Deposit {
    Deposit::paid(
        DepositId("deposit-test".to_string()),
        LeaseId("lease-test".to_string()),
        amount,
        now(),
    )
}

#[test]
fn new_deposit_starts_paid() {
    let deposit = paid_deposit(euros(250, 0));
    assert_eq!(deposit.status, DepositStatus::Paid);
    assert!(deposit.revoked_amount.is_none());
    assert!(deposit.refunded_amount.is_none());
    assert!(deposit.refunded_at.is_none());
}

#[test]
fn partial_revocation_refunds_the_difference() {
    let mut deposit = paid_deposit(euros(250, 0));
    deposit.settle(euros(50, 0), now()).expect("partial settlement");
    assert_eq!(deposit.status, DepositStatus::PartiallyRefunded);
    assert_eq!(deposit.revoked_amount, Some(euros(50, 0)));
    assert_eq!(deposit.refunded_amount, Some(euros(200, 0)));
    assert_eq!(deposit.refunded_at, Some(now()));
}

#[test]
fn zero_revocation_refunds_in_full() {
    let mut deposit = paid_deposit(euros(250, 0));
    deposit.settle(Decimal::ZERO, now()).expect("full refund");
    assert_eq!(deposit.status, DepositStatus::FullyRefunded);
    assert_eq!(deposit.refunded_amount, Some(euros(250, 0)));
}

#[test]
fn full_revocation_withdraws_the_deposit() {
    let mut deposit = paid_deposit(euros(250, 0));
    deposit.settle(euros(250, 0), now()).expect("withdrawal");
    assert_eq!(deposit.status, DepositStatus::Withdrawn);
    assert_eq!(deposit.refunded_amount, Some(Decimal::ZERO));
}

#[test]
fn refund_arithmetic_is_exact_on_cents() {
    let mut deposit = paid_deposit(euros(100, 10));
    deposit.settle(euros(0, 30), now()).expect("cent-level settlement");
    assert_eq!(deposit.refunded_amount, Some(euros(99, 80)));
    assert_eq!(deposit.status, DepositStatus::PartiallyRefunded);
}

#[test]
fn refund_never_goes_negative() {
    let mut deposit = paid_deposit(euros(250, 0));
    let err = deposit
        .settle(euros(300, 0), now())
        .expect_err("revocation above the deposit must fail");
    assert_eq!(
        err,
        DepositError::RevocationExceedsDeposit {
            paid: euros(250, 0),
            revoked: euros(300, 0),
        }
    );
    assert_eq!(deposit.status, DepositStatus::Paid);
    assert!(deposit.refunded_amount.is_none(), "no partial mutation");
}

#[test]
fn negative_revocation_is_rejected() {
    let mut deposit = paid_deposit(euros(250, 0));
    let err = deposit
        .settle(-euros(10, 0), now())
        .expect_err("negative revocation must fail");
    assert_eq!(err, DepositError::NegativeRevocation { revoked: -euros(10, 0) });
    assert_eq!(deposit.status, DepositStatus::Paid);
}

#[test]
fn settled_deposits_are_terminal() {
    let revocations = [Decimal::ZERO, euros(50, 0), euros(250, 0)];
    for revoked in revocations {
        let mut deposit = paid_deposit(euros(250, 0));
        deposit.settle(revoked, now()).expect("first settlement");
        let settled = deposit.status;
        assert!(settled.is_terminal());

        let before = deposit.clone();
        let err = deposit
            .settle(euros(10, 0), now())
            .expect_err("second settlement must fail");
        assert!(
            matches!(err, DepositError::Transition(TransitionError::Terminal { state, .. }) if state == settled)
        );
        assert_eq!(deposit, before);
    }
}
