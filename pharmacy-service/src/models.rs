use chrono::{DateTime, NaiveDate, Utc};
use billing_service::max_amount;
use database_layer::{generate_business_id, Collection, Entity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn default_reorder_level() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
    Expired,
}

impl StockStatus {
    /// Expiry wins over quantity. At or below the reorder level is low stock.
    pub fn derive(quantity: u32, reorder_level: u32, expiry_date: NaiveDate, today: NaiveDate) -> Self {
        if expiry_date < today {
            StockStatus::Expired
        } else if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= reorder_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Needs reordering
    pub fn is_low(&self) -> bool {
        matches!(self, StockStatus::LowStock | StockStatus::OutOfStock)
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StockStatus::InStock => "in-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::OutOfStock => "out-of-stock",
            StockStatus::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// One inventory batch of a medicine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub batch_number: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default = "default_reorder_level")]
    pub reorder_level: u32,
    /// Purchase price
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub selling_price: Decimal,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub status: StockStatus,
}

impl Medicine {
    pub fn stock_status(&self, today: NaiveDate) -> StockStatus {
        StockStatus::derive(self.quantity, self.reorder_level, self.expiry_date, today)
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }
}

impl Entity for Medicine {
    const COLLECTION: Collection = Collection::Medicines;
    const READ_ONLY_FIELDS: &'static [&'static str] = &["status"];
    const DATE_DERIVED_FIELDS: &'static [&'static str] = &["status"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn refresh_derived(&mut self) -> Result<(), String> {
        self.refresh_for_date(Utc::now().date_naive());
        Ok(())
    }

    fn refresh_for_date(&mut self, today: NaiveDate) {
        self.status = self.stock_status(today);
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.unit_price < Decimal::ZERO || self.selling_price < Decimal::ZERO {
            return Err("prices cannot be negative".to_string());
        }
        let limit = max_amount();
        if self.unit_price > limit || self.selling_price > limit {
            return Err(format!("prices cannot exceed {limit}"));
        }
        Ok(())
    }
}

/// A prescribed medicine. `medicine_name` is matched against inventory
/// names, then generic names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionLine {
    pub medicine_name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrescriptionStatus {
    #[default]
    Pending,
    Dispensed,
    /// Accepted on input, never produced by dispensing
    PartiallyDispensed,
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Dispensed => "dispensed",
            PrescriptionStatus::PartiallyDispensed => "partially-dispensed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `RX-...`
    #[serde(default)]
    pub prescription_id: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub medicines: Vec<PrescriptionLine>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: PrescriptionStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub dispensed_at: Option<DateTime<Utc>>,
    /// Pharmacy invoice raised on dispensing
    pub invoice_id: Option<Uuid>,
}

impl Entity for Prescription {
    const COLLECTION: Collection = Collection::Prescriptions;
    const READ_ONLY_FIELDS: &'static [&'static str] =
        &["prescriptionId", "status", "dispensedAt", "invoiceId"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.prescription_id)
    }

    fn prepare_insert(&mut self) {
        if self.prescription_id.is_empty() {
            self.prescription_id = generate_business_id("RX");
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.medicines.is_empty() {
            return Err("a prescription needs at least one medicine".to_string());
        }
        for line in &self.medicines {
            if line.medicine_name.trim().is_empty() {
                return Err("medicineName is required".to_string());
            }
            if line.quantity == 0 {
                return Err(format!("quantity for {} must be at least 1", line.medicine_name));
            }
        }
        Ok(())
    }
}
