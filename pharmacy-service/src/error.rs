use billing_service::BillingError;
use database_layer::DatabaseError;
use error_common::{codes, ErrorCategory, ErrorClassification};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PharmacyError {
    #[error("Insufficient stock for {medicine}: requested {requested}, available {available}")]
    InsufficientStock {
        medicine: String,
        requested: u32,
        available: u32,
    },

    #[error("No medicine in inventory matches '{0}'")]
    MedicineNotFound(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ErrorClassification for PharmacyError {
    fn category(&self) -> ErrorCategory {
        match self {
            PharmacyError::InsufficientStock { .. } => ErrorCategory::Unprocessable,
            PharmacyError::MedicineNotFound(_) | PharmacyError::NotFound { .. } => {
                ErrorCategory::NotFound
            }
            PharmacyError::InvalidState(_) => ErrorCategory::Conflict,
            PharmacyError::Validation(_) => ErrorCategory::Validation,
            PharmacyError::Billing(e) => e.category(),
            PharmacyError::Database(e) => e.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PharmacyError::InsufficientStock { .. } => codes::pharmacy::INSUFFICIENT_STOCK,
            PharmacyError::MedicineNotFound(_) => codes::pharmacy::MEDICINE_NOT_FOUND,
            PharmacyError::NotFound { .. } => codes::database::NOT_FOUND,
            PharmacyError::InvalidState(_) => codes::pharmacy::PRESCRIPTION_NOT_PENDING,
            PharmacyError::Validation(_) => codes::validation::INVALID_INPUT,
            PharmacyError::Billing(e) => e.code(),
            PharmacyError::Database(e) => e.code(),
        }
    }
}

pub type PharmacyResult<T> = Result<T, PharmacyError>;
