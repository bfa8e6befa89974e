//! Billing Service for CareDesk
//!
//! - Invoice creation with derived totals and status
//! - Payment reconciliation (`unpaid` → `partial` → `paid`)
//! - Insurance claims for the uncovered remainder of an invoice

pub mod error;
pub mod models;
pub mod reconciliation;
pub mod service;

pub use error::*;
pub use models::*;
pub use reconciliation::*;
pub use service::*;
