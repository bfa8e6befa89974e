use accounting_service::AccountingService;
use billing_service::BillingService;
use config_engine::{AppConfig, StoreBackend};
use database_layer::{Database, SqliteConfig};
use error_common::{CareDeskError, Result};
use insurance_service::InsuranceService;
use pharmacy_service::PharmacyService;
use registry_service::RegistryService;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct CareDeskServer {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub registry: RegistryService,
    pub insurance: InsuranceService,
    pub billing: BillingService,
    pub pharmacy: PharmacyService,
    pub accounting: AccountingService,
    started_at: Instant,
}

impl CareDeskServer {
    /// Open the configured store and wire the services to it
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = match config.database.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store; records are lost on restart");
                Database::in_memory()
            }
            StoreBackend::Sqlite => {
                let sqlite = SqliteConfig {
                    db_path: config.database.path.clone(),
                    max_connections: config.database.max_connections,
                    enable_wal: config.database.enable_wal,
                };
                Database::sqlite(&sqlite).await.map_err(|e| {
                    CareDeskError::PersistenceError(format!(
                        "opening SQLite store at {}: {e}",
                        config.database.path
                    ))
                })?
            }
        };
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: AppConfig, db: Database) -> Self {
        let billing = BillingService::new(db.clone(), config.billing.clone());
        Self {
            registry: RegistryService::new(db.clone()),
            insurance: InsuranceService::new(db.clone()),
            pharmacy: PharmacyService::new(db.clone(), billing.clone()),
            accounting: AccountingService::new(db.clone()),
            billing,
            db,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Default configuration over an empty in-memory store
    pub fn in_memory() -> Self {
        Self::with_database(AppConfig::default(), Database::in_memory())
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
