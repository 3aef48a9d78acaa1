use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rentals::machine::{self, StatusSet, TransitionError, TransitionOp};

/// Identifier wrapper for leases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseId(pub String);

/// Lifecycle status of a venue booking.
///
/// A lease enters as a `Request` and either travels the quotation route or is
/// held as an option directly. `Finalized` and `Cancelled` admit no further
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Request,
    Quotation,
    Option,
    Confirmed,
    Finalized,
    Cancelled,
}

impl LeaseStatus {
    const ALL: [Self; 6] = [
        Self::Request,
        Self::Quotation,
        Self::Option,
        Self::Confirmed,
        Self::Finalized,
        Self::Cancelled,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Quotation => "quotation",
            Self::Option => "option",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StatusSet for LeaseStatus {
    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }
}

/// The declared edges of the lease graph, one operation per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseTransition {
    ToQuotation,
    ToOption,
    ToConfirmed,
    ToCancelled,
    ToFinalized,
}

impl TransitionOp for LeaseTransition {
    type Status = LeaseStatus;

    fn all() -> &'static [Self] {
        &[
            Self::ToQuotation,
            Self::ToOption,
            Self::ToConfirmed,
            Self::ToCancelled,
            Self::ToFinalized,
        ]
    }

    fn sources(self) -> &'static [LeaseStatus] {
        match self {
            Self::ToQuotation => &[LeaseStatus::Request],
            Self::ToOption => &[LeaseStatus::Request, LeaseStatus::Quotation],
            Self::ToConfirmed => &[LeaseStatus::Option],
            Self::ToCancelled => &[
                LeaseStatus::Quotation,
                LeaseStatus::Option,
                LeaseStatus::Confirmed,
            ],
            Self::ToFinalized => &[LeaseStatus::Confirmed],
        }
    }

    fn target(self) -> LeaseStatus {
        match self {
            Self::ToQuotation => LeaseStatus::Quotation,
            Self::ToOption => LeaseStatus::Option,
            Self::ToConfirmed => LeaseStatus::Confirmed,
            Self::ToCancelled => LeaseStatus::Cancelled,
            Self::ToFinalized => LeaseStatus::Finalized,
        }
    }
}

/// A venue booking with its tenant, date range, and lifecycle status.
///
/// Mutates only through the transition methods; persistence is the caller's
/// explicit, separate step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub tenant: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub status: LeaseStatus,
    pub status_changed_at: DateTime<Utc>,
    pub cancellation_reason: Option<String>,
}

impl Lease {
    /// Register a new booking request.
    pub fn request(
        id: LeaseId,
        tenant: String,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tenant,
            starts_on,
            ends_on,
            status: LeaseStatus::Request,
            status_changed_at: now,
            cancellation_reason: None,
        }
    }

    /// Send the tenant a quotation for the requested booking.
    pub fn quote(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError<LeaseStatus>> {
        self.apply(LeaseTransition::ToQuotation, now)
    }

    /// Hold the requested dates as an option for the tenant.
    pub fn place_option(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError<LeaseStatus>> {
        self.apply(LeaseTransition::ToOption, now)
    }

    /// Confirm an optioned booking.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError<LeaseStatus>> {
        self.apply(LeaseTransition::ToConfirmed, now)
    }

    /// Close out a confirmed booking after the rental period.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError<LeaseStatus>> {
        self.apply(LeaseTransition::ToFinalized, now)
    }

    /// Cancel the booking, optionally recording why.
    pub fn cancel(
        &mut self,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError<LeaseStatus>> {
        self.apply(LeaseTransition::ToCancelled, now)?;
        self.cancellation_reason = reason;
        Ok(())
    }

    fn apply(
        &mut self,
        op: LeaseTransition,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError<LeaseStatus>> {
        let next = machine::check(self.status, op)?;
        self.status = next;
        self.status_changed_at = now;
        Ok(())
    }
}
