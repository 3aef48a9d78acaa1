//! Back office domain for a venue rental portal.
//!
//! The interesting machinery lives in [`rentals`]: one table-driven status
//! state machine per entity family (leases, issues/changelogs, invoices and
//! quotations, deposits), a service facade that wires them to persistence,
//! authorization, and notification collaborators, and an HTTP router over the
//! facade. [`config`], [`telemetry`], and [`error`] carry the service-level
//! plumbing.

pub mod config;
pub mod error;
pub mod rentals;
pub mod telemetry;
