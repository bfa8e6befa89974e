// Stock matching and draw-down for a prescription, without touching storage
use crate::error::{PharmacyError, PharmacyResult};
use crate::models::{Medicine, Prescription};
use billing_service::InvoiceItem;
use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

pub const PHARMACY_CATEGORY: &str = "pharmacy";

/// Units taken from one inventory batch
#[derive(Debug, Clone, PartialEq)]
pub struct StockDraw {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub batch_number: Option<String>,
    pub quantity: u32,
    pub selling_price: Decimal,
}

impl StockDraw {
    pub fn to_invoice_item(&self) -> InvoiceItem {
        let description = match &self.batch_number {
            Some(batch) => format!("{} (batch {})", self.medicine_name, batch),
            None => self.medicine_name.clone(),
        };
        InvoiceItem {
            description,
            category: PHARMACY_CATEGORY.to_string(),
            quantity: self.quantity,
            unit_price: self.selling_price,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispensePlan {
    pub draws: Vec<StockDraw>,
    /// Every touched medicine with its reduced quantity and re-derived status
    pub medicines: Vec<Medicine>,
}

impl DispensePlan {
    pub fn invoice_items(&self) -> Vec<InvoiceItem> {
        self.draws.iter().map(StockDraw::to_invoice_item).collect()
    }

    /// `None` when the total leaves the decimal range
    pub fn subtotal(&self) -> Option<Decimal> {
        self.draws.iter().try_fold(Decimal::ZERO, |sum, d| {
            sum.checked_add(Decimal::from(d.quantity).checked_mul(d.selling_price)?)
        })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Inventory records a prescribed name refers to: brand name matches first,
/// generic name matches only when no brand name does
pub fn resolve<'a>(medicine_name: &str, inventory: &'a [Medicine]) -> Vec<&'a Medicine> {
    let wanted = normalize(medicine_name);
    let by_name: Vec<&Medicine> = inventory
        .iter()
        .filter(|m| normalize(&m.name) == wanted)
        .collect();
    if !by_name.is_empty() {
        return by_name;
    }
    inventory
        .iter()
        .filter(|m| m.generic_name.as_deref().map(normalize).as_deref() == Some(wanted.as_str()))
        .collect()
}

/// Work out which batches cover every line of `prescription`.
///
/// Expired batches are skipped and the earliest-expiring batch is used first.
/// Lines naming the same medicine draw from the same running stock. Fails on
/// the first line that cannot be covered in full.
pub fn plan_dispense(
    prescription: &Prescription,
    inventory: &[Medicine],
    today: NaiveDate,
) -> PharmacyResult<DispensePlan> {
    let mut remaining: HashMap<Uuid, u32> = HashMap::new();
    let mut draws = Vec::new();

    for line in &prescription.medicines {
        let candidates = resolve(&line.medicine_name, inventory);
        if candidates.is_empty() {
            return Err(PharmacyError::MedicineNotFound(line.medicine_name.clone()));
        }

        let usable = candidates
            .into_iter()
            .filter(|m| !m.is_expired(today))
            .sorted_by(|a, b| {
                a.expiry_date
                    .cmp(&b.expiry_date)
                    .then_with(|| a.batch_number.cmp(&b.batch_number))
            })
            .collect_vec();

        let available = usable
            .iter()
            .map(|m| remaining.get(&m.id).copied().unwrap_or(m.quantity))
            .fold(0u32, u32::saturating_add);
        if available < line.quantity {
            return Err(PharmacyError::InsufficientStock {
                medicine: line.medicine_name.clone(),
                requested: line.quantity,
                available,
            });
        }

        let mut needed = line.quantity;
        for medicine in usable {
            if needed == 0 {
                break;
            }
            let left = remaining.entry(medicine.id).or_insert(medicine.quantity);
            let take = needed.min(*left);
            if take == 0 {
                continue;
            }
            *left -= take;
            needed -= take;
            draws.push(StockDraw {
                medicine_id: medicine.id,
                medicine_name: medicine.name.clone(),
                batch_number: medicine.batch_number.clone(),
                quantity: take,
                selling_price: medicine.selling_price,
            });
        }
    }

    let medicines = inventory
        .iter()
        .filter_map(|m| {
            let left = *remaining.get(&m.id)?;
            if left == m.quantity {
                return None;
            }
            let mut updated = m.clone();
            updated.quantity = left;
            updated.status = updated.stock_status(today);
            Some(updated)
        })
        .collect();

    Ok(DispensePlan { draws, medicines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrescriptionLine, PrescriptionStatus, StockStatus};
    use chrono::Utc;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn medicine(name: &str, generic: Option<&str>, batch: &str, quantity: u32, expiry: NaiveDate) -> Medicine {
        Medicine {
            id: Uuid::new_v4(),
            name: name.to_string(),
            generic_name: generic.map(str::to_string),
            category: Some("tablet".into()),
            manufacturer: None,
            batch_number: Some(batch.to_string()),
            quantity,
            reorder_level: 10,
            unit_price: Decimal::new(150, 2),
            selling_price: Decimal::new(200, 2),
            expiry_date: expiry,
            status: StockStatus::InStock,
        }
    }

    fn prescription(lines: &[(&str, u32)]) -> Prescription {
        Prescription {
            id: Uuid::new_v4(),
            prescription_id: "RX-20261019-000001".into(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            medicines: lines
                .iter()
                .map(|(name, quantity)| PrescriptionLine {
                    medicine_name: name.to_string(),
                    dosage: None,
                    frequency: None,
                    duration: None,
                    quantity: *quantity,
                })
                .collect(),
            diagnosis: None,
            notes: None,
            status: PrescriptionStatus::Pending,
            created_at: Utc::now(),
            dispensed_at: None,
            invoice_id: None,
        }
    }

    fn days(n: i64) -> NaiveDate {
        today() + chrono::Duration::days(n)
    }

    #[test]
    fn test_shortfall_reports_available() {
        let inventory = vec![medicine("Cetirizine", None, "C1", 3, days(100))];
        let err = plan_dispense(&prescription(&[("Cetirizine", 5)]), &inventory, today()).unwrap_err();
        match err {
            PharmacyError::InsufficientStock { medicine, requested, available } => {
                assert_eq!(medicine, "Cetirizine");
                assert_eq!(requested, 5);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_generic_name_fallback_is_case_insensitive() {
        let inventory = vec![medicine("Crocin 500", Some("Paracetamol"), "P1", 40, days(100))];
        let plan = plan_dispense(&prescription(&[("  paracetamol ", 10)]), &inventory, today()).unwrap();
        assert_eq!(plan.draws.len(), 1);
        assert_eq!(plan.medicines[0].quantity, 30);
        assert_eq!(plan.medicines[0].status, StockStatus::InStock);
    }

    #[test]
    fn test_brand_name_beats_generic() {
        let brand = medicine("Dolo", Some("Paracetamol"), "D1", 20, days(100));
        let generic = medicine("Paracetamol", None, "P1", 20, days(100));
        let inventory = vec![brand.clone(), generic.clone()];
        let plan = plan_dispense(&prescription(&[("Paracetamol", 5)]), &inventory, today()).unwrap();
        assert_eq!(plan.draws[0].medicine_id, generic.id);
    }

    #[test]
    fn test_first_expiring_batch_first_and_expired_skipped() {
        let expired = medicine("Azithral", None, "A0", 50, days(-1));
        let later = medicine("Azithral", None, "A2", 50, days(200));
        let sooner = medicine("Azithral", None, "A1", 4, days(30));
        let inventory = vec![expired.clone(), later.clone(), sooner.clone()];

        let plan = plan_dispense(&prescription(&[("Azithral", 6)]), &inventory, today()).unwrap();
        assert_eq!(plan.draws.len(), 2);
        assert_eq!(plan.draws[0].medicine_id, sooner.id);
        assert_eq!(plan.draws[0].quantity, 4);
        assert_eq!(plan.draws[1].medicine_id, later.id);
        assert_eq!(plan.draws[1].quantity, 2);
        assert!(plan.medicines.iter().all(|m| m.id != expired.id));

        let sooner_after = plan.medicines.iter().find(|m| m.id == sooner.id).unwrap();
        assert_eq!(sooner_after.status, StockStatus::OutOfStock);
    }

    #[test]
    fn test_only_expired_stock_is_a_shortfall() {
        let inventory = vec![medicine("Azithral", None, "A0", 50, days(-1))];
        assert!(matches!(
            plan_dispense(&prescription(&[("Azithral", 1)]), &inventory, today()),
            Err(PharmacyError::InsufficientStock { available: 0, .. })
        ));
    }

    #[test]
    fn test_repeated_lines_draw_down_cumulatively() {
        let inventory = vec![medicine("Pantoprazole", None, "X1", 12, days(60))];
        assert!(plan_dispense(&prescription(&[("Pantoprazole", 6), ("pantoprazole", 6)]), &inventory, today()).is_ok());
        let err = plan_dispense(&prescription(&[("Pantoprazole", 8), ("Pantoprazole", 8)]), &inventory, today())
            .unwrap_err();
        assert!(matches!(err, PharmacyError::InsufficientStock { requested: 8, available: 4, .. }));
    }

    #[test]
    fn test_unknown_medicine() {
        let inventory = vec![medicine("Cetirizine", None, "C1", 3, days(100))];
        assert!(matches!(
            plan_dispense(&prescription(&[("Montelukast", 1)]), &inventory, today()),
            Err(PharmacyError::MedicineNotFound(name)) if name == "Montelukast"
        ));
    }

    #[test]
    fn test_invoice_items_use_selling_price() {
        let inventory = vec![medicine("Cetirizine", None, "C1", 30, days(100))];
        let plan = plan_dispense(&prescription(&[("Cetirizine", 5)]), &inventory, today()).unwrap();
        let items = plan.invoice_items();
        assert_eq!(items[0].category, PHARMACY_CATEGORY);
        assert_eq!(items[0].unit_price, Decimal::new(200, 2));
        assert_eq!(items[0].description, "Cetirizine (batch C1)");
        assert_eq!(plan.subtotal(), Some(Decimal::from(10)));
    }

    proptest! {
        #[test]
        fn prop_draws_cover_request_without_overdraw(
            stocks in proptest::collection::vec(0u32..40, 1..5),
            wanted in 1u32..120,
        ) {
            let inventory: Vec<Medicine> = stocks
                .iter()
                .enumerate()
                .map(|(i, q)| medicine("Ibuprofen", None, &format!("B{i}"), *q, days(10 + i as i64)))
                .collect();
            let total: u32 = stocks.iter().sum();

            match plan_dispense(&prescription(&[("Ibuprofen", wanted)]), &inventory, today()) {
                Ok(plan) => {
                    prop_assert!(wanted <= total);
                    let drawn: u32 = plan.draws.iter().map(|d| d.quantity).sum();
                    prop_assert_eq!(drawn, wanted);
                    let left: u32 = inventory
                        .iter()
                        .map(|m| plan.medicines.iter().find(|u| u.id == m.id).map_or(m.quantity, |u| u.quantity))
                        .sum();
                    prop_assert_eq!(left, total - wanted);
                }
                Err(PharmacyError::InsufficientStock { available, .. }) => {
                    prop_assert!(wanted > total);
                    prop_assert_eq!(available, total);
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }
}
