use billing_service::{Invoice, PaymentMethod};
use chrono::NaiveDate;
use insurance_service::InsuranceClaim;
use pharmacy_service::{Medicine, Prescription};
use registry_service::{Admission, Appointment, Doctor, LabOrder, Patient};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time copy of every collection the dashboard reads
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub admissions: Vec<Admission>,
    pub lab_orders: Vec<LabOrder>,
    pub medicines: Vec<Medicine>,
    pub prescriptions: Vec<Prescription>,
    pub invoices: Vec<Invoice>,
    pub claims: Vec<InsuranceClaim>,
}

/// Dashboard counters and totals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_patients: u64,
    pub total_doctors: u64,
    pub available_doctors: u64,
    pub today_appointments: u64,
    pub admitted_patients: u64,
    /// Low stock or out of stock
    pub low_stock_medicines: u64,
    pub expired_medicines: u64,
    pub pending_prescriptions: u64,
    pub pending_lab_orders: u64,
    /// Unpaid, partial or overdue
    pub unpaid_invoices: u64,
    /// Submitted or under review
    pub pending_claims: u64,
    pub total_revenue: Decimal,
    pub outstanding_balance: Decimal,
}

/// Inclusive invoice-date range; open ends are unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Outstanding balances by invoice age
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgingBuckets {
    #[serde(rename = "age0To30")]
    pub age_0_30: Decimal,
    #[serde(rename = "age31To60")]
    pub age_31_60: Decimal,
    #[serde(rename = "age61To90")]
    pub age_61_90: Decimal,
    #[serde(rename = "age91Plus")]
    pub age_91_plus: Decimal,
}

impl AgingBuckets {
    pub fn add(&mut self, age_days: i64, amount: Decimal) {
        let bucket = match age_days {
            i64::MIN..=30 => &mut self.age_0_30,
            31..=60 => &mut self.age_31_60,
            61..=90 => &mut self.age_61_90,
            _ => &mut self.age_91_plus,
        };
        *bucket += amount;
    }

    pub fn total(&self) -> Decimal {
        self.age_0_30 + self.age_31_60 + self.age_61_90 + self.age_91_plus
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub period: ReportPeriod,
    pub invoice_count: u64,
    /// Sum of invoice totals
    pub billed: Decimal,
    pub collected: Decimal,
    pub outstanding: Decimal,
    pub by_payment_method: BTreeMap<PaymentMethod, Decimal>,
    /// Billed line amounts per item category, before tax and discount
    pub by_category: BTreeMap<String, Decimal>,
    pub receivables: AgingBuckets,
}
