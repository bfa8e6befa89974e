use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::{codes, report_error, ErrorCategory, ErrorClassification, ErrorContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Unique error ID, also written to the log
    pub error_id: String,
    pub error_type: String,
    /// Stable machine-readable code such as `BILLING_1001`
    pub code: String,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Failure raised by a domain service or the store
    #[error("{message}")]
    Service {
        category: ErrorCategory,
        code: &'static str,
        message: String,
    },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Wrap any classified service error
    pub fn service<E>(error: &E) -> Self
    where
        E: ErrorClassification + fmt::Display,
    {
        Self::Service {
            category: error.category(),
            code: error.code(),
            message: error.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::Persistence | ErrorCategory::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "bad_request",
            _ => match self.category() {
                ErrorCategory::Validation => "validation_error",
                ErrorCategory::NotFound => "not_found",
                ErrorCategory::Conflict => "conflict",
                ErrorCategory::Unprocessable => "unprocessable_entity",
                ErrorCategory::Persistence => "persistence_failure",
                ErrorCategory::Internal => "internal_error",
            },
        }
    }

    /// Get suggested actions for resolving the error
    pub fn suggestions(&self) -> Option<Vec<String>> {
        match self.category() {
            ErrorCategory::Validation => Some(vec![
                "Check the request payload for invalid fields".to_string(),
                "Amounts must be non-negative decimal numbers".to_string(),
            ]),
            ErrorCategory::NotFound => Some(vec![
                "Verify the resource ID is correct".to_string(),
                "Check if the resource was deleted".to_string(),
            ]),
            ErrorCategory::Conflict => Some(vec![
                "Reload the resource and check its current status".to_string(),
            ]),
            ErrorCategory::Unprocessable => Some(vec![
                "The request is well-formed but breaks a business rule; nothing was changed".to_string(),
            ]),
            ErrorCategory::Persistence => Some(vec![
                "No changes were saved; retry the request".to_string(),
                "Contact support if the issue persists".to_string(),
            ]),
            ErrorCategory::Internal => None,
        }
    }

    /// Message safe to return to a client
    fn public_message(&self) -> String {
        match self.category() {
            ErrorCategory::Persistence => "The operation could not be saved. No changes were made.".to_string(),
            ErrorCategory::Internal => "An unexpected error occurred.".to_string(),
            _ => logger_redacted::redact(&self.to_string()),
        }
    }
}

impl ErrorClassification for ApiError {
    fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => ErrorCategory::Validation,
            ApiError::Service { category, .. } => *category,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::INVALID_INPUT,
            ApiError::BadRequest { .. } => codes::validation::INVALID_FORMAT,
            ApiError::Service { code, .. } => *code,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();
        let context = ErrorContext::new()
            .with_request_id(error_id.clone())
            .add_context("error_type", self.error_type())
            .add_context("status_code", status_code.as_u16().to_string());
        report_error(&context, &self);

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            code: self.code().to_string(),
            message: self.public_message(),
            timestamp: chrono::Utc::now(),
            suggestions: self.suggestions(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

macro_rules! impl_from_service_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(error: $error) -> Self {
                    ApiError::service(&error)
                }
            }
        )+
    };
}

impl_from_service_error!(
    database_layer::DatabaseError,
    registry_service::RegistryError,
    insurance_service::InsuranceError,
    billing_service::BillingError,
    pharmacy_service::PharmacyError,
    accounting_service::AccountingError,
);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Helper function to create successful API responses with metadata
pub fn api_success_with_meta<T>(data: T, metadata: ResponseMetadata) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: Some(metadata),
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use billing_service::BillingError;
    use database_layer::{Collection, DatabaseError};
    use pharmacy_service::PharmacyError;
    use rust_decimal::Decimal;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = BillingError::InvalidAmount {
            amount: Decimal::from(-5),
            reason: "negative".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "BILLING_1001");

        let err: ApiError = PharmacyError::InsufficientStock {
            medicine: "Cetirizine".into(),
            requested: 5,
            available: 3,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = DatabaseError::NotFound {
            collection: Collection::Invoices,
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = DatabaseError::QueryFailed("disk I/O error".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_type(), "persistence_failure");
    }

    #[test]
    fn test_persistence_details_stay_internal() {
        let err: ApiError = DatabaseError::QueryFailed("database is locked at /var/lib/caredesk.db".into()).into();
        assert!(!err.public_message().contains("/var/lib"));
    }

    #[test]
    fn test_messages_are_redacted() {
        let err = ApiError::validation("no patient with email asha@example.com");
        assert_eq!(err.public_message(), "Validation error: no patient with email a***@e***");
    }
}
