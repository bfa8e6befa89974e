use crate::dashboard::compute_stats;
use crate::error::{AccountingError, AccountingResult};
use crate::models::*;
use crate::reporting::revenue_report;
use billing_service::Invoice;
use chrono::{NaiveDate, Utc};
use database_layer::Database;
use insurance_service::InsuranceClaim;
use pharmacy_service::{Medicine, Prescription};
use registry_service::{Admission, Appointment, Doctor, LabOrder, Patient};
use tracing::{debug, instrument};

/// Read-only aggregation over the other services' records
#[derive(Debug, Clone)]
pub struct AccountingService {
    db: Database,
}

impl AccountingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn load_collections(&self) -> AccountingResult<Collections> {
        Ok(Collections {
            patients: self.db.repository::<Patient>().all().await?,
            doctors: self.db.repository::<Doctor>().all().await?,
            appointments: self.db.repository::<Appointment>().all().await?,
            admissions: self.db.repository::<Admission>().all().await?,
            lab_orders: self.db.repository::<LabOrder>().all().await?,
            medicines: self.db.repository::<Medicine>().all().await?,
            prescriptions: self.db.repository::<Prescription>().all().await?,
            invoices: self.db.repository::<Invoice>().all().await?,
            claims: self.db.repository::<InsuranceClaim>().all().await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> AccountingResult<StatsSnapshot> {
        self.dashboard_stats_on(Utc::now().date_naive()).await
    }

    pub async fn dashboard_stats_on(&self, today: NaiveDate) -> AccountingResult<StatsSnapshot> {
        let collections = self.load_collections().await?;
        let stats = compute_stats(&collections, today);
        debug!(patients = stats.total_patients, unpaid = stats.unpaid_invoices, "Dashboard stats computed");
        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn revenue_report(&self, period: ReportPeriod) -> AccountingResult<RevenueReport> {
        if let (Some(from), Some(to)) = (period.from, period.to) {
            if from > to {
                return Err(AccountingError::Validation(format!(
                    "report period starts {from} after it ends {to}"
                )));
            }
        }
        let invoices = self.db.repository::<Invoice>().all().await?;
        Ok(revenue_report(&invoices, period, Utc::now().date_naive()))
    }
}
