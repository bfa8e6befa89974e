//! Accounting Service for CareDesk
//!
//! Read-only aggregation over the clinical and billing records:
//! - Dashboard statistics
//! - Revenue report by payment method and item category
//! - Receivables aging

pub mod dashboard;
pub mod error;
pub mod models;
pub mod reporting;
pub mod service;

pub use dashboard::*;
pub use error::*;
pub use models::*;
pub use reporting::*;
pub use service::*;
