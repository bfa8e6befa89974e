pub mod billing;
pub mod health;
pub mod insurance;
pub mod pharmacy;
pub mod records;
pub mod registry;
pub mod reports;
