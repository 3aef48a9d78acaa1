//! Rental back-office core: the status lifecycles for leases, tickets,
//! billing documents, and deposits, plus the seams the surrounding service
//! plugs into (persistence, authorization, notification, HTTP).
//!
//! Every entity owns a plain status enum and mutates only through transition
//! methods validated against its declared table in [`machine`]. Persistence is
//! always a separate, explicit step performed by the caller or the service.

pub mod billing;
pub mod deposits;
pub mod leases;
pub mod machine;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod tickets;

#[cfg(test)]
mod tests;

pub use billing::{BillingConfig, Invoice, InvoiceId, InvoiceStatus, InvoiceTransition};
pub use deposits::{Deposit, DepositError, DepositId, DepositStatus, DepositTransition};
pub use leases::{Lease, LeaseId, LeaseStatus, LeaseTransition};
pub use machine::{StatusSet, TransitionError, TransitionOp};
pub use policy::{Actor, ActorRole, AllowAll, RoleMatrix, TransitionPolicy};
pub use repository::{
    EntityKind, NotifyError, RentalRepository, RepositoryError, TransitionNotice,
    TransitionNotifier,
};
pub use router::rental_router;
pub use service::{BackOffice, BackOfficeError};
pub use tickets::{Changelog, ChangelogError, ChangelogId, Issue, IssueError, IssueId, TicketStatus};
