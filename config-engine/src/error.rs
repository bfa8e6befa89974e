use error_common::{codes, ErrorCategory, ErrorClassification};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration source could not be read: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl ErrorClassification for ConfigError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Internal
    }

    fn code(&self) -> &'static str {
        codes::system::CONFIGURATION
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
