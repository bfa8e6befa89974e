use database_layer::DatabaseError;
use error_common::{codes, ErrorCategory, ErrorClassification};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ErrorClassification for AccountingError {
    fn category(&self) -> ErrorCategory {
        match self {
            AccountingError::Validation(_) => ErrorCategory::Validation,
            AccountingError::Database(e) => e.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AccountingError::Validation(_) => codes::validation::INVALID_INPUT,
            AccountingError::Database(e) => e.code(),
        }
    }
}

pub type AccountingResult<T> = Result<T, AccountingError>;
