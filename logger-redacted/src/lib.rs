//! Logging setup for CareDesk Engine.
//!
//! Two concerns live here:
//!
//! - installing the process-wide `tracing` subscriber ([`init_tracing`]),
//!   either human-readable for development or JSON lines for production;
//! - scrubbing personal data (emails, phone numbers, card numbers, and any
//!   configured patterns such as policy numbers) out of free-text messages
//!   before they reach a log sink or an API error body ([`PiiRedactor`]).
//!
//! Structured fields should carry identifiers (`invoice_id`, `patient_id`),
//! never names or contact details.
//!
//! ```rust
//! use logger_redacted::redact;
//!
//! let line = redact("Reminder sent to 555-123-4567");
//! assert_eq!(line, "Reminder sent to ***-***-****");
//! ```

pub mod config;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use redactor::*;
pub use subscriber::*;

use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};

lazy_static! {
    static ref DEFAULT_REDACTOR: PiiRedactor = PiiRedactor::default();
}

static REDACTION_ENABLED: AtomicBool = AtomicBool::new(true);

/// Switch [`redact`] on or off for the whole process. On by default;
/// [`init_tracing`] applies `LoggerConfig::redaction_enabled`.
pub fn set_redaction_enabled(enabled: bool) {
    REDACTION_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Redact with the default rules
pub fn redact(text: &str) -> String {
    if REDACTION_ENABLED.load(Ordering::Relaxed) {
        DEFAULT_REDACTOR.redact(text)
    } else {
        text.to_string()
    }
}
