//! Invoices and quotations over their shared status column.

pub mod domain;

pub use domain::{BillingConfig, Invoice, InvoiceId, InvoiceStatus, InvoiceTransition};
