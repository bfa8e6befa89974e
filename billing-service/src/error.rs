use database_layer::DatabaseError;
use error_common::{codes, ErrorCategory, ErrorClassification};
use insurance_service::InsuranceError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Invalid payment amount {amount}: {reason}")]
    InvalidAmount { amount: Decimal, reason: String },

    #[error("Invoice {0} not found")]
    InvoiceNotFound(Uuid),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Insurance(#[from] InsuranceError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl BillingError {
    pub(crate) fn invalid_amount(amount: Decimal, reason: impl Into<String>) -> Self {
        BillingError::InvalidAmount {
            amount,
            reason: reason.into(),
        }
    }
}

impl ErrorClassification for BillingError {
    fn category(&self) -> ErrorCategory {
        match self {
            BillingError::InvalidAmount { .. } | BillingError::Validation(_) => {
                ErrorCategory::Validation
            }
            BillingError::InvoiceNotFound(_) | BillingError::NotFound { .. } => {
                ErrorCategory::NotFound
            }
            BillingError::Insurance(e) => e.category(),
            BillingError::Database(e) => e.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            BillingError::InvalidAmount { .. } => codes::billing::INVALID_AMOUNT,
            BillingError::InvoiceNotFound(_) => codes::billing::INVOICE_NOT_FOUND,
            BillingError::NotFound { .. } => codes::database::NOT_FOUND,
            BillingError::Validation(_) => codes::billing::INVALID_INVOICE,
            BillingError::Insurance(e) => e.code(),
            BillingError::Database(e) => e.code(),
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
