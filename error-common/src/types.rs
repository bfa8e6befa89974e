use crate::codes;
use crate::context::ErrorContext;
use serde::Serialize;
use thiserror::Error;

/// How a failure should be surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or out-of-range input
    Validation,
    /// Referenced entity does not exist
    NotFound,
    /// Entity exists but is in the wrong state for the operation
    Conflict,
    /// Input is well-formed but violates a business rule
    Unprocessable,
    /// Storage read or write failed
    Persistence,
    /// Anything else
    Internal,
}

/// Implemented by every service error so the API layer can map it
pub trait ErrorClassification {
    fn category(&self) -> ErrorCategory;

    fn code(&self) -> &'static str;
}

/// Simplified error enum for cross-cutting failures
#[derive(Error, Debug)]
pub enum CareDeskError {
    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Missing entity
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage errors
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Server / startup errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ErrorClassification for CareDeskError {
    fn category(&self) -> ErrorCategory {
        match self {
            CareDeskError::ValidationError(_) => ErrorCategory::Validation,
            CareDeskError::NotFound(_) => ErrorCategory::NotFound,
            CareDeskError::PersistenceError(_) => ErrorCategory::Persistence,
            CareDeskError::ServerError(_)
            | CareDeskError::ConfigError(_)
            | CareDeskError::InternalError(_)
            | CareDeskError::Other(_) => ErrorCategory::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            CareDeskError::ValidationError(_) => codes::validation::INVALID_INPUT,
            CareDeskError::NotFound(_) => codes::database::NOT_FOUND,
            CareDeskError::PersistenceError(_) => codes::database::PERSISTENCE_FAILURE,
            CareDeskError::ConfigError(_) => codes::system::CONFIGURATION,
            CareDeskError::ServerError(_)
            | CareDeskError::InternalError(_)
            | CareDeskError::Other(_) => codes::system::INTERNAL,
        }
    }
}

/// Result type alias for CareDesk operations
pub type Result<T> = std::result::Result<T, CareDeskError>;

/// Emit one structured error event. The message goes through the PII
/// redactor; identifiers travel as fields.
pub fn report_error<E>(context: &ErrorContext, error: &E)
where
    E: ErrorClassification + std::fmt::Display,
{
    let message = logger_redacted::redact(&error.to_string());
    match error.category() {
        ErrorCategory::Persistence | ErrorCategory::Internal => tracing::error!(
            error_code = error.code(),
            category = ?error.category(),
            request_id = context.request_id.as_deref().unwrap_or("-"),
            operation = context.operation.as_deref().unwrap_or("-"),
            entity_type = context.entity_type.as_deref().unwrap_or("-"),
            entity_id = context.entity_id.as_deref().unwrap_or("-"),
            additional = ?context.additional,
            "{}",
            message
        ),
        _ => tracing::warn!(
            error_code = error.code(),
            category = ?error.category(),
            request_id = context.request_id.as_deref().unwrap_or("-"),
            operation = context.operation.as_deref().unwrap_or("-"),
            entity_type = context.entity_type.as_deref().unwrap_or("-"),
            entity_id = context.entity_id.as_deref().unwrap_or("-"),
            additional = ?context.additional,
            "{}",
            message
        ),
    }
}
