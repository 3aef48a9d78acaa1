//! Lease lifecycle: booking requests through finalization or cancellation.

pub mod domain;

pub use domain::{Lease, LeaseId, LeaseStatus, LeaseTransition};
