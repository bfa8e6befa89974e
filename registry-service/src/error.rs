use database_layer::DatabaseError;
use error_common::{codes, ErrorCategory, ErrorClassification};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ErrorClassification for RegistryError {
    fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::NotFound { .. } => ErrorCategory::NotFound,
            RegistryError::InvalidState(_) => ErrorCategory::Conflict,
            RegistryError::Validation(_) => ErrorCategory::Validation,
            RegistryError::Database(e) => e.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RegistryError::NotFound { .. } => codes::registry::NOT_FOUND,
            RegistryError::InvalidState(_) => codes::registry::INVALID_STATE,
            RegistryError::Validation(_) => codes::validation::INVALID_INPUT,
            RegistryError::Database(e) => e.code(),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
