//! Security deposits and their one-time settlement.

pub mod domain;

pub use domain::{Deposit, DepositError, DepositId, DepositStatus, DepositTransition};
