//! Registry Service for CareDesk
//!
//! Patients, doctors, OPD appointments, IPD admissions and lab orders.
//! Most of these are plain CRUD records; [`RegistryService`] adds the
//! booking, admission and discharge rules.

pub mod error;
pub mod models;
pub mod service;

pub use error::*;
pub use models::*;
pub use service::*;
