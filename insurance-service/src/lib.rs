//! Insurance Service for CareDesk
//!
//! - Provider and policy registration
//! - Co-pay calculation (patient vs. insurer portion)
//! - Policy eligibility checks
//! - Claim workflow ([`transition_claim`]), with settlement debiting the policy balance

pub mod copay;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod service;
pub mod workflow;

pub use copay::*;
pub use eligibility::*;
pub use error::*;
pub use models::*;
pub use service::*;
pub use workflow::*;
