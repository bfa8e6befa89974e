use database_layer::DatabaseError;
use error_common::{codes, ErrorCategory, ErrorClassification};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum InsuranceError {
    #[error("Co-pay percentage must be between 0 and 100, got {0}")]
    InvalidCoPay(Decimal),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Policy {policy_number} cannot be used: {reason}")]
    PolicyNotActive { policy_number: String, reason: String },

    #[error("Requested {requested} exceeds remaining coverage {available}")]
    CoverageExceeded { requested: Decimal, available: Decimal },

    #[error("Claim cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ErrorClassification for InsuranceError {
    fn category(&self) -> ErrorCategory {
        match self {
            InsuranceError::InvalidCoPay(_)
            | InsuranceError::InvalidAmount(_)
            | InsuranceError::Validation(_) => ErrorCategory::Validation,
            InsuranceError::PolicyNotActive { .. } | InsuranceError::CoverageExceeded { .. } => {
                ErrorCategory::Unprocessable
            }
            InsuranceError::InvalidTransition { .. } => ErrorCategory::Conflict,
            InsuranceError::NotFound { .. } => ErrorCategory::NotFound,
            InsuranceError::Database(e) => e.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            InsuranceError::InvalidCoPay(_) => codes::insurance::INVALID_CO_PAY,
            InsuranceError::InvalidAmount(_) => codes::billing::INVALID_AMOUNT,
            InsuranceError::PolicyNotActive { .. } => codes::insurance::POLICY_NOT_ACTIVE,
            InsuranceError::CoverageExceeded { .. } => codes::insurance::COVERAGE_EXCEEDED,
            InsuranceError::InvalidTransition { .. } => codes::insurance::INVALID_CLAIM_TRANSITION,
            InsuranceError::NotFound { .. } => codes::insurance::NOT_FOUND,
            InsuranceError::Validation(_) => codes::validation::INVALID_INPUT,
            InsuranceError::Database(e) => e.code(),
        }
    }
}

pub type InsuranceResult<T> = Result<T, InsuranceError>;
