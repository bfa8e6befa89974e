// Configuration validation
use crate::error::{ConfigError, Result};
use crate::settings::{AppConfig, StoreBackend};
use rust_decimal::Decimal;

pub trait ConfigValidator {
    fn validate(&self) -> Result<()>;
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must be non-zero".into()));
        }
        if self.server.request_timeout == 0 {
            return Err(ConfigError::ValidationError(
                "server.request_timeout must be at least one second".into(),
            ));
        }
        if self.database.backend == StoreBackend::Sqlite {
            if self.database.path.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "database.path is required for the sqlite backend".into(),
                ));
            }
            if self.database.max_connections == 0 {
                return Err(ConfigError::ValidationError(
                    "database.max_connections must be at least 1".into(),
                ));
            }
        }
        let tax = self.billing.pharmacy_tax_percent;
        if tax < Decimal::ZERO || tax > Decimal::ONE_HUNDRED {
            return Err(ConfigError::ValidationError(format!(
                "billing.pharmacy_tax_percent must be between 0 and 100, got {tax}"
            )));
        }
        Ok(())
    }
}
