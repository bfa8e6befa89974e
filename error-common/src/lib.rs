//! Common error handling utilities for CareDesk Engine
//!
//! Every service crate defines its own `thiserror` enum for the failures it
//! can produce. This crate provides the pieces they share so the HTTP layer
//! can treat all of them uniformly:
//!
//! - **Error Codes**: stable, machine-readable codes (`BILLING_1001`, ...)
//! - **Classification**: [`ErrorCategory`] decides how a failure is surfaced
//!   (bad input, missing entity, conflicting state, storage failure)
//! - **Context**: [`ErrorContext`] carries request/entity identifiers into logs
//! - **Reporting**: [`report_error`] emits one structured `tracing` event
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, ErrorCategory, ErrorClassification};
//!
//! #[derive(Debug, thiserror::Error)]
//! enum LedgerError {
//!     #[error("amount must not be negative")]
//!     NegativeAmount,
//! }
//!
//! impl ErrorClassification for LedgerError {
//!     fn category(&self) -> ErrorCategory {
//!         ErrorCategory::Validation
//!     }
//!
//!     fn code(&self) -> &'static str {
//!         codes::billing::INVALID_AMOUNT
//!     }
//! }
//!
//! assert_eq!(LedgerError::NegativeAmount.code(), "BILLING_1001");
//! ```

pub mod codes;
pub mod context;
pub mod types;

pub use context::*;
pub use types::*;
