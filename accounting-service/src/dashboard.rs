// Dashboard counters, recomputed from a collections snapshot on every call
use crate::models::{Collections, StatsSnapshot};
use chrono::NaiveDate;
use pharmacy_service::{PrescriptionStatus, StockStatus};
use registry_service::{AdmissionStatus, DoctorStatus, LabOrderStatus};
use rust_decimal::Decimal;

fn count<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> u64 {
    items.iter().filter(|item| predicate(item)).count() as u64
}

/// Derived statuses (stock, invoice) are evaluated against `today` rather
/// than read from the stored records, which may predate an expiry or due date.
pub fn compute_stats(collections: &Collections, today: NaiveDate) -> StatsSnapshot {
    let stock: Vec<StockStatus> = collections
        .medicines
        .iter()
        .map(|m| m.stock_status(today))
        .collect();

    StatsSnapshot {
        total_patients: collections.patients.len() as u64,
        total_doctors: collections.doctors.len() as u64,
        available_doctors: count(&collections.doctors, |d| d.status == DoctorStatus::Available),
        today_appointments: count(&collections.appointments, |a| a.date == today),
        admitted_patients: count(&collections.admissions, |a| a.status == AdmissionStatus::Admitted),
        low_stock_medicines: count(&stock, |s| s.is_low()),
        expired_medicines: count(&stock, |s| *s == StockStatus::Expired),
        pending_prescriptions: count(&collections.prescriptions, |p| {
            p.status == PrescriptionStatus::Pending
        }),
        pending_lab_orders: count(&collections.lab_orders, |l| l.status == LabOrderStatus::Pending),
        unpaid_invoices: count(&collections.invoices, |i| i.derive_status(today).is_outstanding()),
        pending_claims: count(&collections.claims, |c| c.status.is_pending()),
        total_revenue: collections.invoices.iter().map(|i| i.paid_amount).sum(),
        outstanding_balance: collections
            .invoices
            .iter()
            .map(|i| i.balance_due())
            .sum::<Decimal>(),
    }
}
