use logger_redacted::LoggerConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub billing: BillingSettings,
    pub logging: LoggerConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: 30,
        }
    }
}

/// Which store implementation backs the entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    /// SQLite file path (ignored for the memory backend)
    pub path: String,
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: "caredesk.db".to_string(),
            max_connections: 5,
            enable_wal: true,
        }
    }
}

/// Defaults applied to invoices the system generates itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    /// Tax added to generated pharmacy invoices, in percent of the subtotal
    pub pharmacy_tax_percent: Decimal,
    /// Days between invoice date and due date
    pub payment_terms_days: u32,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            pharmacy_tax_percent: Decimal::ZERO,
            payment_terms_days: 30,
        }
    }
}
