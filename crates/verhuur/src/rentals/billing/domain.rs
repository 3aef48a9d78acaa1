use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rentals::leases::LeaseId;
use crate::rentals::machine::{self, StatusSet, TransitionError, TransitionOp};

/// Identifier wrapper for invoices and quotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

/// Billing settings consumed by the service when opening documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingConfig {
    /// Days between opening an invoice and its payment deadline.
    pub payment_term_days: i64,
}

impl BillingConfig {
    pub fn due_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.payment_term_days)
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            payment_term_days: 14,
        }
    }
}

/// Status of a billing document over its shared status column.
///
/// Quotation documents enter at `QuotationRequest` and merge into the payment
/// lifecycle at `Open` when accepted; plain invoices enter at `Draft`. There
/// is no edge from a payment state back into a quotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    QuotationRequest,
    Quotation,
    QuotationDeclined,
    Draft,
    Open,
    Paid,
    Void,
    Uncollected,
}

impl InvoiceStatus {
    const ALL: [Self; 8] = [
        Self::QuotationRequest,
        Self::Quotation,
        Self::QuotationDeclined,
        Self::Draft,
        Self::Open,
        Self::Paid,
        Self::Void,
        Self::Uncollected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::QuotationRequest => "quotation_request",
            Self::Quotation => "quotation",
            Self::QuotationDeclined => "quotation_declined",
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Paid => "paid",
            Self::Void => "void",
            Self::Uncollected => "uncollected",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StatusSet for InvoiceStatus {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Void | Self::QuotationDeclined)
    }
}

/// The declared edges of the billing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceTransition {
    SendQuotation,
    DeclineQuotation,
    AcceptQuotation,
    Issue,
    MarkPaid,
    MarkVoid,
    MarkUncollected,
}

impl TransitionOp for InvoiceTransition {
    type Status = InvoiceStatus;

    fn all() -> &'static [Self] {
        &[
            Self::SendQuotation,
            Self::DeclineQuotation,
            Self::AcceptQuotation,
            Self::Issue,
            Self::MarkPaid,
            Self::MarkVoid,
            Self::MarkUncollected,
        ]
    }

    fn sources(self) -> &'static [InvoiceStatus] {
        match self {
            Self::SendQuotation => &[InvoiceStatus::QuotationRequest],
            Self::DeclineQuotation => &[InvoiceStatus::Quotation],
            Self::AcceptQuotation => &[InvoiceStatus::Quotation],
            Self::Issue => &[InvoiceStatus::Draft],
            // Uncollected debts can still be recovered or written off.
            Self::MarkPaid => &[InvoiceStatus::Open, InvoiceStatus::Uncollected],
            Self::MarkVoid => &[InvoiceStatus::Open, InvoiceStatus::Uncollected],
            Self::MarkUncollected => &[InvoiceStatus::Open],
        }
    }

    fn target(self) -> InvoiceStatus {
        match self {
            Self::SendQuotation => InvoiceStatus::Quotation,
            Self::DeclineQuotation => InvoiceStatus::QuotationDeclined,
            Self::AcceptQuotation => InvoiceStatus::Open,
            Self::Issue => InvoiceStatus::Open,
            Self::MarkPaid => InvoiceStatus::Paid,
            Self::MarkVoid => InvoiceStatus::Void,
            Self::MarkUncollected => InvoiceStatus::Uncollected,
        }
    }
}

/// A billing document (invoice or quotation) tied to a lease.
///
/// Every transition assigns the status together with its timestamp side
/// effects in one mutation, so a `Paid` or `Void` document never carries a
/// `due_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub lease_id: LeaseId,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub due_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub status_changed_at: DateTime<Utc>,
}

impl Invoice {
    /// Create a plain invoice in its drafting state.
    pub fn draft(id: InvoiceId, lease_id: LeaseId, amount: Decimal, now: DateTime<Utc>) -> Self {
        Self::new(id, lease_id, amount, InvoiceStatus::Draft, now)
    }

    /// Create a quotation document awaiting an offer.
    pub fn quotation_request(
        id: InvoiceId,
        lease_id: LeaseId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(id, lease_id, amount, InvoiceStatus::QuotationRequest, now)
    }

    fn new(
        id: InvoiceId,
        lease_id: LeaseId,
        amount: Decimal,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            lease_id,
            amount,
            status,
            due_at: None,
            paid_at: None,
            status_changed_at: now,
        }
    }

    /// Send the prepared quotation to the prospective tenant.
    pub fn send_quotation(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError<InvoiceStatus>> {
        self.apply(InvoiceTransition::SendQuotation, now)
    }

    /// Record that the tenant declined the quotation.
    pub fn decline_quotation(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError<InvoiceStatus>> {
        self.apply(InvoiceTransition::DeclineQuotation, now)
    }

    /// Accept the quotation, turning it into an open invoice due at `due_at`.
    pub fn accept_quotation(
        &mut self,
        now: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> Result<(), TransitionError<InvoiceStatus>> {
        self.apply(InvoiceTransition::AcceptQuotation, now)?;
        self.due_at = Some(due_at);
        Ok(())
    }

    /// Issue the drafted invoice, making it payable by `due_at`.
    pub fn issue(
        &mut self,
        now: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> Result<(), TransitionError<InvoiceStatus>> {
        self.apply(InvoiceTransition::Issue, now)?;
        self.due_at = Some(due_at);
        Ok(())
    }

    /// Record full payment: sets `paid_at` and clears the due date.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError<InvoiceStatus>> {
        self.apply(InvoiceTransition::MarkPaid, now)?;
        self.paid_at = Some(now);
        self.due_at = None;
        Ok(())
    }

    /// Write the invoice off: clears the due date.
    pub fn mark_void(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError<InvoiceStatus>> {
        self.apply(InvoiceTransition::MarkVoid, now)?;
        self.due_at = None;
        Ok(())
    }

    /// Flag the invoice as uncollected; the overdue due date is kept.
    pub fn mark_uncollected(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError<InvoiceStatus>> {
        self.apply(InvoiceTransition::MarkUncollected, now)
    }

    fn apply(
        &mut self,
        op: InvoiceTransition,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError<InvoiceStatus>> {
        let next = machine::check(self.status, op)?;
        self.status = next;
        self.status_changed_at = now;
        Ok(())
    }
}
