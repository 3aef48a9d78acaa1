use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rentals::leases::LeaseId;
use crate::rentals::machine::{self, StatusSet, TransitionError, TransitionOp};

/// Identifier wrapper for security deposits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepositId(pub String);

/// Status of a security deposit.
///
/// A deposit exists because it was paid; the only transition is the one-time
/// settlement after the lease ends, so every non-`Paid` state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Paid,
    Withdrawn,
    PartiallyRefunded,
    FullyRefunded,
}

impl DepositStatus {
    const ALL: [Self; 4] = [
        Self::Paid,
        Self::Withdrawn,
        Self::PartiallyRefunded,
        Self::FullyRefunded,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Withdrawn => "withdrawn",
            Self::PartiallyRefunded => "partially_refunded",
            Self::FullyRefunded => "fully_refunded",
        }
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StatusSet for DepositStatus {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn is_terminal(self) -> bool {
        !matches!(self, Self::Paid)
    }
}

/// The declared edges of the deposit graph.
///
/// Callers never pick one of these directly; [`Deposit::settle`] derives the
/// edge from the revoked amount so the target can never contradict the
/// arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositTransition {
    Withdraw,
    RefundPartially,
    RefundFully,
}

impl TransitionOp for DepositTransition {
    type Status = DepositStatus;

    fn all() -> &'static [Self] {
        &[Self::Withdraw, Self::RefundPartially, Self::RefundFully]
    }

    fn sources(self) -> &'static [DepositStatus] {
        &[DepositStatus::Paid]
    }

    fn target(self) -> DepositStatus {
        match self {
            Self::Withdraw => DepositStatus::Withdrawn,
            Self::RefundPartially => DepositStatus::PartiallyRefunded,
            Self::RefundFully => DepositStatus::FullyRefunded,
        }
    }
}

/// Error raised when settling a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DepositError {
    #[error(transparent)]
    Transition(#[from] TransitionError<DepositStatus>),
    #[error("revoked amount {revoked} exceeds the paid deposit {paid}")]
    RevocationExceedsDeposit { paid: Decimal, revoked: Decimal },
    #[error("revoked amount {revoked} is negative")]
    NegativeRevocation { revoked: Decimal },
}

/// A security payment tied to a lease, settled after lease completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub lease_id: LeaseId,
    pub paid_amount: Decimal,
    pub revoked_amount: Option<Decimal>,
    pub refunded_amount: Option<Decimal>,
    pub status: DepositStatus,
    pub paid_at: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl Deposit {
    /// Register a deposit the tenant has paid.
    pub fn paid(id: DepositId, lease_id: LeaseId, paid_amount: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            id,
            lease_id,
            paid_amount,
            revoked_amount: None,
            refunded_amount: None,
            status: DepositStatus::Paid,
            paid_at: now,
            refunded_at: None,
        }
    }

    /// Settle the deposit: withhold `revoked` and refund the remainder.
    ///
    /// The refunded amount is `paid_amount - revoked` and cannot go negative
    /// because oversized revocations are rejected before any field changes.
    /// Zero revoked yields a full refund, a full revocation withdraws the
    /// deposit, anything in between refunds partially.
    pub fn settle(&mut self, revoked: Decimal, now: DateTime<Utc>) -> Result<(), DepositError> {
        if revoked < Decimal::ZERO {
            return Err(DepositError::NegativeRevocation { revoked });
        }
        if revoked > self.paid_amount {
            return Err(DepositError::RevocationExceedsDeposit {
                paid: self.paid_amount,
                revoked,
            });
        }

        let op = if revoked.is_zero() {
            DepositTransition::RefundFully
        } else if revoked == self.paid_amount {
            DepositTransition::Withdraw
        } else {
            DepositTransition::RefundPartially
        };

        let next = machine::check(self.status, op)?;
        self.revoked_amount = Some(revoked);
        self.refunded_amount = Some(self.paid_amount - revoked);
        self.refunded_at = Some(now);
        self.status = next;
        Ok(())
    }
}
