use crate::collection::Collection;
use error_common::{codes, ErrorCategory, ErrorClassification};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: Uuid },

    #[error("{collection} record {id} already exists")]
    Conflict { collection: Collection, id: Uuid },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A patch tried to touch a field only the owning service may change
    #[error("Field '{field}' of {collection} cannot be modified directly")]
    ReadOnlyField { collection: Collection, field: String },

    /// The stored document (or a patch applied to it) does not decode
    #[error("Invalid {collection} record: {message}")]
    InvalidRecord { collection: Collection, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

impl ErrorClassification for DatabaseError {
    fn category(&self) -> ErrorCategory {
        match self {
            DatabaseError::NotFound { .. } => ErrorCategory::NotFound,
            DatabaseError::Conflict { .. } => ErrorCategory::Conflict,
            DatabaseError::InvalidQuery(_)
            | DatabaseError::ReadOnlyField { .. }
            | DatabaseError::InvalidRecord { .. } => ErrorCategory::Validation,
            DatabaseError::ConnectionFailed(_)
            | DatabaseError::QueryFailed(_)
            | DatabaseError::Serialization(_)
            | DatabaseError::SqlxError(_) => ErrorCategory::Persistence,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            DatabaseError::NotFound { .. } => codes::database::NOT_FOUND,
            DatabaseError::Conflict { .. } => codes::database::CONFLICT,
            DatabaseError::InvalidQuery(_) | DatabaseError::ReadOnlyField { .. } => {
                codes::validation::INVALID_INPUT
            }
            DatabaseError::InvalidRecord { .. } => codes::validation::INVALID_FORMAT,
            DatabaseError::Serialization(_) => codes::database::CORRUPT_RECORD,
            DatabaseError::ConnectionFailed(_)
            | DatabaseError::QueryFailed(_)
            | DatabaseError::SqlxError(_) => codes::database::PERSISTENCE_FAILURE,
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
