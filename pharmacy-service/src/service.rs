use crate::dispensing::{plan_dispense, resolve};
use crate::error::{PharmacyError, PharmacyResult};
use crate::models::*;
use billing_service::{round_money, BillingService, Invoice, NewInvoice};
use chrono::Utc;
use database_layer::{Database, Entity, WriteBatch};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Everything written by one dispense
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenseOutcome {
    pub prescription: Prescription,
    pub invoice: Invoice,
    pub medicines: Vec<Medicine>,
}

/// Pharmacy service
#[derive(Debug, Clone)]
pub struct PharmacyService {
    db: Database,
    billing: BillingService,
}

impl PharmacyService {
    pub fn new(db: Database, billing: BillingService) -> Self {
        Self { db, billing }
    }

    async fn prescription(&self, id: Uuid) -> PharmacyResult<Prescription> {
        let prescription = self
            .db
            .repository::<Prescription>()
            .find(id)
            .await?
            .ok_or(PharmacyError::NotFound {
                entity: "Prescription",
                id,
            })?;
        if prescription.status != PrescriptionStatus::Pending {
            return Err(PharmacyError::InvalidState(format!(
                "prescription {} is {}, only pending prescriptions can be dispensed",
                prescription.prescription_id, prescription.status
            )));
        }
        Ok(prescription)
    }

    /// Dispense a pending prescription in full and bill it.
    ///
    /// The prescription and every candidate medicine are locked, then the
    /// stock decrements, the prescription update and the pharmacy invoice
    /// are committed as one batch. Any shortfall leaves everything as it was.
    #[instrument(skip(self))]
    pub async fn dispense(&self, prescription_id: Uuid) -> PharmacyResult<DispenseOutcome> {
        let medicines = self.db.repository::<Medicine>();

        let prescription = self.prescription(prescription_id).await?;
        let inventory = medicines.all().await?;
        let candidates: BTreeSet<Uuid> = prescription
            .medicines
            .iter()
            .flat_map(|line| resolve(&line.medicine_name, &inventory))
            .map(|m| m.id)
            .collect();

        let keys = std::iter::once((Prescription::COLLECTION, prescription_id))
            .chain(candidates.iter().map(|id| (Medicine::COLLECTION, *id)));
        let _locks = self.db.locks().acquire_all(keys).await;

        // Re-read under the locks; only locked batches may be drawn from.
        let prescription = self.prescription(prescription_id).await?;
        let mut locked = Vec::with_capacity(candidates.len());
        for id in &candidates {
            if let Some(medicine) = medicines.find(*id).await? {
                locked.push(medicine);
            }
        }

        let today = Utc::now().date_naive();
        let plan = match plan_dispense(&prescription, &locked, today) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(prescription_id = %prescription.prescription_id, error = %e, "Dispense refused");
                return Err(e);
            }
        };

        let tax_percent = self.billing.settings().pharmacy_tax_percent;
        let tax = plan
            .subtotal()
            .and_then(|subtotal| subtotal.checked_mul(tax_percent))
            .map(|gross| round_money(gross / Decimal::ONE_HUNDRED))
            .ok_or_else(|| PharmacyError::Validation("pharmacy bill is out of range".to_string()))?;
        let invoice = self
            .billing
            .build_invoice(NewInvoice {
                patient_id: prescription.patient_id,
                patient_name: None,
                items: plan.invoice_items(),
                tax,
                discount: Decimal::ZERO,
                date: Some(today),
                due_date: None,
                notes: Some(format!("Pharmacy bill for {}", prescription.prescription_id)),
                prescription_id: Some(prescription.id),
            })
            .await?;

        let mut dispensed = prescription;
        dispensed.status = PrescriptionStatus::Dispensed;
        dispensed.dispensed_at = Some(Utc::now());
        dispensed.invoice_id = Some(invoice.id);

        let mut batch = WriteBatch::new();
        for medicine in &plan.medicines {
            batch.update(medicine)?;
        }
        batch.update(&dispensed)?;
        batch.insert(&invoice)?;
        self.db.commit(batch).await?;

        for medicine in plan.medicines.iter().filter(|m| m.status.is_low()) {
            warn!(medicine = %medicine.name, quantity = medicine.quantity, status = %medicine.status, "Stock needs reordering");
        }
        info!(
            prescription_id = %dispensed.prescription_id,
            invoice_id = %invoice.invoice_id,
            total = %invoice.total,
            "Prescription dispensed"
        );

        Ok(DispenseOutcome {
            prescription: dispensed,
            invoice,
            medicines: plan.medicines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_service::InvoiceStatus;
    use config_engine::BillingSettings;
    use database_layer::{Collection, WriteOp};
    use serde_json::json;

    struct Fixture {
        db: Database,
        service: PharmacyService,
        patient_id: Uuid,
    }

    async fn fixture(tax_percent: i64) -> Fixture {
        let db = Database::in_memory();
        let patient_id = Uuid::new_v4();
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Insert {
            collection: Collection::Patients,
            id: patient_id,
            business_id: None,
            document: json!({"id": patient_id, "name": "Meera Iyer"}),
        });
        db.commit(batch).await.unwrap();

        let settings = BillingSettings {
            pharmacy_tax_percent: Decimal::from(tax_percent),
            ..BillingSettings::default()
        };
        let billing = BillingService::new(db.clone(), settings);
        Fixture {
            service: PharmacyService::new(db.clone(), billing),
            db,
            patient_id,
        }
    }

    async fn stock(db: &Database, name: &str, quantity: u32, price: &str) -> Medicine {
        db.repository::<Medicine>()
            .create(
                serde_json::from_value(json!({
                    "name": name,
                    "batchNumber": "B-01",
                    "quantity": quantity,
                    "reorderLevel": 10,
                    "unitPrice": "1.00",
                    "sellingPrice": price,
                    "expiryDate": "2099-12-31"
                }))
                .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn prescribe(f: &Fixture, lines: serde_json::Value) -> Prescription {
        f.db.repository::<Prescription>()
            .create(
                serde_json::from_value(json!({
                    "patientId": f.patient_id,
                    "doctorId": Uuid::new_v4(),
                    "medicines": lines
                }))
                .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_dispense_updates_stock_and_bills() {
        let f = fixture(5).await;
        let amox = stock(&f.db, "Amoxicillin 500mg", 30, "12.00").await;
        let pcm = stock(&f.db, "Paracetamol 650mg", 100, "2.50").await;
        let rx = prescribe(
            &f,
            json!([
                {"medicineName": "Amoxicillin 500mg", "dosage": "1 cap", "frequency": "TID", "quantity": 15},
                {"medicineName": "paracetamol 650mg", "quantity": 10}
            ]),
        )
        .await;

        let outcome = f.service.dispense(rx.id).await.unwrap();
        assert_eq!(outcome.prescription.status, PrescriptionStatus::Dispensed);
        assert_eq!(outcome.prescription.invoice_id, Some(outcome.invoice.id));
        assert!(outcome.prescription.dispensed_at.is_some());

        // 15 x 12.00 + 10 x 2.50 = 205.00, 5% tax = 10.25
        assert_eq!(outcome.invoice.subtotal, Decimal::new(20500, 2));
        assert_eq!(outcome.invoice.tax, Decimal::new(1025, 2));
        assert_eq!(outcome.invoice.total, Decimal::new(21525, 2));
        assert_eq!(outcome.invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(outcome.invoice.patient_name, "Meera Iyer");
        assert!(outcome.invoice.items.iter().all(|i| i.category == "pharmacy"));

        let medicines = f.db.repository::<Medicine>();
        let amox_after = medicines.get(amox.id).await.unwrap();
        assert_eq!(amox_after.quantity, 15);
        assert_eq!(amox_after.status, StockStatus::InStock);
        assert_eq!(medicines.get(pcm.id).await.unwrap().quantity, 90);

        let stored = f.db.repository::<Invoice>().get(outcome.invoice.id).await.unwrap();
        assert_eq!(stored.prescription_id, Some(rx.id));
    }

    #[tokio::test]
    async fn test_batch_expiring_after_write_reads_expired() {
        let f = fixture(0).await;
        let id = Uuid::new_v4();
        let yesterday = Utc::now().date_naive() - chrono::Duration::days(1);
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Insert {
            collection: Collection::Medicines,
            id,
            business_id: None,
            document: json!({
                "id": id,
                "name": "Cefixime 200mg",
                "quantity": 40,
                "sellingPrice": "9.00",
                "expiryDate": yesterday,
                "status": "in-stock"
            }),
        });
        f.db.commit(batch).await.unwrap();
        stock(&f.db, "Cetirizine 10mg", 50, "1.50").await;

        let medicines = f.db.repository::<Medicine>();
        assert_eq!(medicines.get(id).await.unwrap().status, StockStatus::Expired);

        let expired = database_layer::ListQuery::new().filter("status", "expired");
        let listed = medicines.list(&expired).await.unwrap();
        assert_eq!(listed.iter().map(|m| m.id).collect::<Vec<_>>(), vec![id]);
        assert_eq!(medicines.count(&expired).await.unwrap(), 1);
        let in_stock = database_layer::ListQuery::new().filter("status", "in-stock");
        assert_eq!(medicines.count(&in_stock).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shortfall_changes_nothing() {
        let f = fixture(0).await;
        let plenty = stock(&f.db, "Metformin 500mg", 60, "3.00").await;
        let scarce = stock(&f.db, "Glimepiride 2mg", 3, "6.00").await;
        let rx = prescribe(
            &f,
            json!([
                {"medicineName": "Metformin 500mg", "quantity": 30},
                {"medicineName": "Glimepiride 2mg", "quantity": 5}
            ]),
        )
        .await;

        let err = f.service.dispense(rx.id).await.unwrap_err();
        assert!(matches!(
            err,
            PharmacyError::InsufficientStock { requested: 5, available: 3, .. }
        ));

        let medicines = f.db.repository::<Medicine>();
        assert_eq!(medicines.get(plenty.id).await.unwrap().quantity, 60);
        assert_eq!(medicines.get(scarce.id).await.unwrap().quantity, 3);
        let rx_after = f.db.repository::<Prescription>().get(rx.id).await.unwrap();
        assert_eq!(rx_after.status, PrescriptionStatus::Pending);
        assert_eq!(f.db.repository::<Invoice>().all().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_dispense_twice_is_rejected() {
        let f = fixture(0).await;
        stock(&f.db, "Cetirizine 10mg", 20, "1.50").await;
        let rx = prescribe(&f, json!([{"medicineName": "Cetirizine 10mg", "quantity": 5}])).await;

        f.service.dispense(rx.id).await.unwrap();
        assert!(matches!(
            f.service.dispense(rx.id).await,
            Err(PharmacyError::InvalidState(_))
        ));
        assert_eq!(f.db.repository::<Invoice>().all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_prescription_and_medicine() {
        let f = fixture(0).await;
        assert!(matches!(
            f.service.dispense(Uuid::new_v4()).await,
            Err(PharmacyError::NotFound { entity: "Prescription", .. })
        ));

        let rx = prescribe(&f, json!([{"medicineName": "Unobtainium", "quantity": 1}])).await;
        assert!(matches!(
            f.service.dispense(rx.id).await,
            Err(PharmacyError::MedicineNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_dispenses_never_oversell() {
        let f = fixture(0).await;
        let medicine = stock(&f.db, "Insulin Glargine", 10, "450.00").await;
        let first = prescribe(&f, json!([{"medicineName": "Insulin Glargine", "quantity": 6}])).await;
        let second = prescribe(&f, json!([{"medicineName": "Insulin Glargine", "quantity": 6}])).await;

        let (a, b) = tokio::join!(f.service.dispense(first.id), f.service.dispense(second.id));
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let left = f.db.repository::<Medicine>().get(medicine.id).await.unwrap();
        assert_eq!(left.quantity, 4);
        assert_eq!(left.status, StockStatus::LowStock);
    }
}
