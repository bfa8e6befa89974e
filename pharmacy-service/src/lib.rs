//! Pharmacy Service for CareDesk
//!
//! - Medicine inventory with stock status derived from quantity, reorder
//!   level and expiry
//! - Prescriptions and all-or-nothing dispensing
//! - Pharmacy invoices raised through `billing-service`

pub mod dispensing;
pub mod error;
pub mod models;
pub mod service;

pub use dispensing::*;
pub use error::*;
pub use models::*;
pub use service::*;
