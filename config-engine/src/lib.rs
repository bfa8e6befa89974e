//! Configuration management for CareDesk Engine
//!
//! Configuration is assembled from three layers, later layers winning:
//!
//! 1. built-in defaults ([`AppConfig::default`])
//! 2. an optional file (`caredesk.yaml`, `caredesk.toml`, ...)
//! 3. environment variables prefixed with `CAREDESK__`, using `__` as the
//!    section separator (`CAREDESK__DATABASE__BACKEND=memory`)
//!
//! The result is validated before it is handed out.
//!
//! ```rust,no_run
//! use config_engine::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_file("caredesk.yaml")
//!     .load()
//!     .expect("valid configuration");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod error;
pub mod providers;
pub mod settings;
pub mod validation;

pub use error::*;
pub use providers::*;
pub use settings::*;
pub use validation::ConfigValidator;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Sqlite);
        assert_eq!(config.billing.payment_terms_days, 30);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[database]\nbackend = \"memory\"\n\n[billing]\npharmacy_tax_percent = \"5\""
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path().to_string_lossy().to_string())
            .load()
            .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.billing.pharmacy_tax_percent, Decimal::from(5));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ConfigLoader::new()
            .with_file("/nonexistent/caredesk.yaml")
            .load()
            .unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_rejects_out_of_range_tax() {
        let mut config = AppConfig::default();
        config.billing.pharmacy_tax_percent = Decimal::from(150);
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }
}
