use crate::error::{BillingError, BillingResult};
use crate::models::*;
use crate::reconciliation::{apply_payment, credit_settlement, PaymentOutcome, PaymentRequest};
use chrono::{Duration, NaiveDate, Utc};
use config_engine::BillingSettings;
use database_layer::{Collection, Database, Entity, ListQuery, WriteBatch};
use insurance_service::{
    transition_claim, ClaimStatus, ClaimStatusUpdate, InsuranceClaim, InsurancePolicy,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// Fields accepted when raising an invoice
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub patient_id: Uuid,
    /// Looked up from the patient record when absent
    pub patient_name: Option<String>,
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub date: Option<NaiveDate>,
    /// Defaults to `date` plus the configured payment terms
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub prescription_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusOutcome {
    pub claim: InsuranceClaim,
    /// The debited policy, when the claim settled
    pub policy: Option<InsurancePolicy>,
    /// The invoice credited with the payout, when the claim settled
    pub invoice: Option<Invoice>,
}

/// Billing service
#[derive(Debug, Clone)]
pub struct BillingService {
    db: Database,
    settings: BillingSettings,
}

impl BillingService {
    pub fn new(db: Database, settings: BillingSettings) -> Self {
        Self { db, settings }
    }

    pub fn settings(&self) -> &BillingSettings {
        &self.settings
    }

    /// Assemble a complete, validated invoice without writing it, so callers
    /// can add it to their own write batch
    pub async fn build_invoice(&self, new: NewInvoice) -> BillingResult<Invoice> {
        if new.items.is_empty() {
            return Err(BillingError::Validation(
                "an invoice needs at least one item".to_string(),
            ));
        }

        let patient_name = match new.patient_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.patient_name(new.patient_id).await?,
        };
        let date = new.date.unwrap_or_else(|| Utc::now().date_naive());
        let due_date = new.due_date.unwrap_or_else(|| {
            date + Duration::days(i64::from(self.settings.payment_terms_days))
        });

        let mut invoice = Invoice {
            id: Uuid::new_v4(),
            invoice_id: String::new(),
            patient_id: new.patient_id,
            patient_name,
            items: new.items,
            subtotal: Decimal::ZERO,
            tax: new.tax,
            discount: new.discount,
            total: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            status: InvoiceStatus::Unpaid,
            date,
            due_date: Some(due_date),
            notes: new.notes,
            prescription_id: new.prescription_id,
            payments: Vec::new(),
        };
        invoice.prepare_insert();
        invoice
            .refresh_derived()
            .and_then(|()| invoice.validate())
            .map_err(BillingError::Validation)?;
        Ok(invoice)
    }

    #[instrument(skip(self, new), fields(patient_id = %new.patient_id))]
    pub async fn create_invoice(&self, new: NewInvoice) -> BillingResult<Invoice> {
        let invoice = self.build_invoice(new).await?;
        let mut batch = WriteBatch::new();
        batch.insert(&invoice)?;
        self.db.commit(batch).await?;
        info!(invoice_id = %invoice.invoice_id, total = %invoice.total, "Invoice created");
        Ok(invoice)
    }

    pub async fn get_invoice(&self, invoice_id: Uuid) -> BillingResult<Invoice> {
        self.db
            .repository::<Invoice>()
            .find(invoice_id)
            .await?
            .ok_or(BillingError::InvoiceNotFound(invoice_id))
    }

    /// Apply a payment and, when a policy covers part of the rest, raise the
    /// claim. The invoice, its payment record and the claim are written in
    /// one batch while the invoice is locked.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn record_payment(
        &self,
        invoice_id: Uuid,
        request: PaymentRequest,
    ) -> BillingResult<PaymentOutcome> {
        let _lock = self.db.locks().acquire(Invoice::COLLECTION, invoice_id).await;
        let invoice = self.get_invoice(invoice_id).await?;

        let policy = match request.policy_id {
            Some(policy_id) => Some(
                self.db
                    .repository::<InsurancePolicy>()
                    .find(policy_id)
                    .await?
                    .ok_or(BillingError::NotFound {
                        entity: "Policy",
                        id: policy_id,
                    })?,
            ),
            None => None,
        };
        let existing_claims = if policy.is_some() {
            self.db
                .repository::<InsuranceClaim>()
                .list(&ListQuery::new().filter("invoiceId", invoice_id.to_string()))
                .await?
        } else {
            Vec::new()
        };

        let outcome = apply_payment(
            &invoice,
            &request,
            policy.as_ref(),
            &existing_claims,
            Utc::now().date_naive(),
        )?;

        let mut batch = WriteBatch::new();
        batch.update(&outcome.invoice)?;
        if let Some(claim) = &outcome.claim {
            batch.insert(claim)?;
        }
        self.db.commit(batch).await?;

        info!(
            invoice_id = %outcome.invoice.invoice_id,
            amount = %outcome.payment.amount,
            status = %outcome.invoice.status,
            claim_id = outcome.claim.as_ref().map(|c| c.claim_id.as_str()).unwrap_or("-"),
            "Payment recorded"
        );
        Ok(outcome)
    }

    /// Move a claim through its workflow. Settling debits the policy and
    /// credits the invoice with the payout, in the same write as the claim.
    #[instrument(skip(self, update), fields(status = %update.status))]
    pub async fn update_claim_status(
        &self,
        claim_id: Uuid,
        update: ClaimStatusUpdate,
    ) -> BillingResult<ClaimStatusOutcome> {
        let claims = self.db.repository::<InsuranceClaim>();
        let not_found = || BillingError::NotFound {
            entity: "Claim",
            id: claim_id,
        };

        // policyId and invoiceId are read-only, so these keys stay valid
        let seen = claims.find(claim_id).await?.ok_or_else(not_found)?;
        let _locks = self
            .db
            .locks()
            .acquire_all([
                (InsuranceClaim::COLLECTION, claim_id),
                (InsurancePolicy::COLLECTION, seen.policy_id),
                (Invoice::COLLECTION, seen.invoice_id),
            ])
            .await;
        let claim = claims.find(claim_id).await?.ok_or_else(not_found)?;
        let policy = self
            .db
            .repository::<InsurancePolicy>()
            .find(claim.policy_id)
            .await?
            .ok_or(BillingError::NotFound {
                entity: "Policy",
                id: claim.policy_id,
            })?;

        let now = Utc::now();
        let transition = transition_claim(claim, &policy, update, now)?;
        let mut batch = WriteBatch::new();
        batch.update(&transition.claim)?;
        if let Some(debited) = &transition.policy {
            batch.update(debited)?;
        }

        let mut credited = None;
        if transition.claim.status == ClaimStatus::Settled {
            let invoice = self.get_invoice(transition.claim.invoice_id).await?;
            credited = credit_settlement(&invoice, &transition.claim, now.date_naive());
            if let Some(invoice) = &credited {
                batch.update(invoice)?;
            }
        }
        self.db.commit(batch).await?;

        info!(
            claim_id = %transition.claim.claim_id,
            status = %transition.claim.status,
            credited = credited.is_some(),
            "Claim status updated"
        );
        Ok(ClaimStatusOutcome {
            claim: transition.claim,
            policy: transition.policy,
            invoice: credited,
        })
    }

    async fn patient_name(&self, patient_id: Uuid) -> BillingResult<String> {
        let patient = self
            .db
            .store()
            .get(Collection::Patients, patient_id)
            .await?
            .ok_or(BillingError::NotFound {
                entity: "Patient",
                id: patient_id,
            })?;
        Ok(patient
            .get("name")
            .and_then(|name| name.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database_layer::{
        DatabaseError, DatabaseResult, DocumentStore, MemoryStore, SharedStore, WriteOp,
    };
    use insurance_service::{ClaimStatus, CoverageType, PolicyStatus};
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn seed_patient(db: &Database) -> Uuid {
        let id = Uuid::new_v4();
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Insert {
            collection: Collection::Patients,
            id,
            business_id: None,
            document: json!({"id": id, "name": "Ravi Kumar"}),
        });
        db.commit(batch).await.unwrap();
        id
    }

    fn consultation(patient_id: Uuid, fee: i64) -> NewInvoice {
        NewInvoice {
            patient_id,
            patient_name: None,
            items: vec![InvoiceItem {
                description: "Consultation".into(),
                category: "consultation".into(),
                quantity: 1,
                unit_price: Decimal::from(fee),
            }],
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            date: None,
            due_date: None,
            notes: None,
            prescription_id: None,
        }
    }

    fn pay(amount: i64, policy_id: Option<Uuid>) -> PaymentRequest {
        PaymentRequest {
            amount: Decimal::from(amount),
            method: PaymentMethod::Upi,
            policy_id,
            reference: Some("UPI-REF-1".into()),
        }
    }

    async fn seed_policy(db: &Database, patient_id: Uuid, co_pay: i64) -> InsurancePolicy {
        db.repository::<InsurancePolicy>()
            .create(InsurancePolicy {
                id: Uuid::new_v4(),
                policy_id: String::new(),
                patient_id,
                company_id: Uuid::new_v4(),
                company_name: "Care Assure".into(),
                policy_number: "CA-5521".into(),
                coverage_type: CoverageType::CoPay,
                coverage_limit: Decimal::from(50_000),
                co_pay_percent: Decimal::from(co_pay),
                balance_remaining: Decimal::from(50_000),
                expiry_date: Utc::now().date_naive() + Duration::days(90),
                status: PolicyStatus::Active,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_invoice_fills_defaults() {
        let db = Database::in_memory();
        let service = BillingService::new(db.clone(), BillingSettings::default());
        let patient = seed_patient(&db).await;

        let invoice = service.create_invoice(consultation(patient, 500)).await.unwrap();
        assert!(invoice.invoice_id.starts_with("INV-"));
        assert_eq!(invoice.patient_name, "Ravi Kumar");
        assert_eq!(invoice.total, Decimal::from(500));
        assert_eq!(invoice.due_date, Some(invoice.date + Duration::days(30)));
        assert_eq!(service.get_invoice(invoice.id).await.unwrap(), invoice);
    }

    #[tokio::test]
    async fn test_create_invoice_requires_known_patient_and_items() {
        let service = BillingService::new(Database::in_memory(), BillingSettings::default());
        assert!(matches!(
            service.create_invoice(consultation(Uuid::new_v4(), 100)).await,
            Err(BillingError::NotFound { entity: "Patient", .. })
        ));

        let mut empty = consultation(Uuid::new_v4(), 100);
        empty.items.clear();
        assert!(matches!(
            service.create_invoice(empty).await,
            Err(BillingError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_invoice_rejects_amounts_out_of_range() {
        let db = Database::in_memory();
        let service = BillingService::new(db.clone(), BillingSettings::default());
        let patient = seed_patient(&db).await;

        let mut huge = consultation(patient, 1);
        huge.items[0].quantity = 2;
        huge.items[0].unit_price = Decimal::MAX;
        assert!(matches!(
            service.create_invoice(huge).await,
            Err(BillingError::Validation(_))
        ));
        assert_eq!(
            db.repository::<Invoice>().count(&ListQuery::new()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_invoice_written_before_due_date_reads_overdue() {
        let db = Database::in_memory();
        let service = BillingService::new(db.clone(), BillingSettings::default());
        let patient = seed_patient(&db).await;
        let id = Uuid::new_v4();
        let yesterday = Utc::now().date_naive() - Duration::days(1);

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Insert {
            collection: Collection::Invoices,
            id,
            business_id: Some("INV-20261001-000042".into()),
            document: json!({
                "id": id,
                "invoiceId": "INV-20261001-000042",
                "patientId": patient,
                "subtotal": "750",
                "total": "750",
                "status": "unpaid",
                "date": yesterday - Duration::days(30),
                "dueDate": yesterday
            }),
        });
        db.commit(batch).await.unwrap();

        assert_eq!(service.get_invoice(id).await.unwrap().status, InvoiceStatus::Overdue);

        let invoices = db.repository::<Invoice>();
        let overdue = ListQuery::new().filter("status", "overdue");
        assert_eq!(invoices.list(&overdue).await.unwrap().len(), 1);
        assert_eq!(invoices.count(&overdue).await.unwrap(), 1);
        let unpaid = ListQuery::new().filter("status", "unpaid");
        assert!(invoices.list(&unpaid).await.unwrap().is_empty());
        assert_eq!(invoices.count(&unpaid).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_payments_in_sequence() {
        let db = Database::in_memory();
        let service = BillingService::new(db.clone(), BillingSettings::default());
        let patient = seed_patient(&db).await;
        let invoice = service.create_invoice(consultation(patient, 500)).await.unwrap();

        let first = service.record_payment(invoice.id, pay(200, None)).await.unwrap();
        assert_eq!(first.invoice.status, InvoiceStatus::Partial);
        let second = service.record_payment(invoice.id, pay(300, None)).await.unwrap();
        assert_eq!(second.invoice.status, InvoiceStatus::Paid);

        let stored = service.get_invoice(invoice.id).await.unwrap();
        assert_eq!(stored.paid_amount, Decimal::from(500));
        assert_eq!(stored.payments.len(), 2);
        assert_eq!(stored.payments[0].reference.as_deref(), Some("UPI-REF-1"));

        assert!(matches!(
            service.record_payment(invoice.id, pay(1, None)).await,
            Err(BillingError::InvalidAmount { .. })
        ));
        assert!(matches!(
            service.record_payment(Uuid::new_v4(), pay(1, None)).await,
            Err(BillingError::InvoiceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_record_payment_with_policy_persists_claim() {
        let db = Database::in_memory();
        let service = BillingService::new(db.clone(), BillingSettings::default());
        let patient = seed_patient(&db).await;
        let policy = seed_policy(&db, patient, 20).await;
        let invoice = service.create_invoice(consultation(patient, 1000)).await.unwrap();

        let outcome = service
            .record_payment(invoice.id, pay(200, Some(policy.id)))
            .await
            .unwrap();
        let claim = outcome.claim.unwrap();
        assert_eq!(claim.claim_amount, Decimal::from(640));

        let stored = db.repository::<InsuranceClaim>().get(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Submitted);
        assert_eq!(stored.invoice_id, invoice.id);

        // the open claim already covers the insurer's share
        let next = service
            .record_payment(invoice.id, pay(160, Some(policy.id)))
            .await
            .unwrap();
        assert!(next.claim.is_none());
        assert_eq!(
            db.repository::<InsuranceClaim>().count(&ListQuery::new()).await.unwrap(),
            1
        );
    }

    /// Store whose commits always fail, to check nothing partial is left behind
    struct FailingCommits {
        inner: MemoryStore,
    }

    #[async_trait::async_trait]
    impl DocumentStore for FailingCommits {
        fn backend(&self) -> &'static str {
            "failing"
        }

        async fn get(&self, collection: Collection, id: Uuid) -> DatabaseResult<Option<Value>> {
            self.inner.get(collection, id).await
        }

        async fn list(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<Vec<Value>> {
            self.inner.list(collection, query).await
        }

        async fn count(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<u64> {
            self.inner.count(collection, query).await
        }

        async fn commit(&self, _batch: WriteBatch) -> DatabaseResult<()> {
            Err(DatabaseError::QueryFailed("disk full".into()))
        }
    }

    fn to(status: ClaimStatus) -> ClaimStatusUpdate {
        ClaimStatusUpdate {
            status,
            approved_amount: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_settled_claim_debits_policy_and_credits_invoice() {
        let db = Database::in_memory();
        let service = BillingService::new(db.clone(), BillingSettings::default());
        let patient = seed_patient(&db).await;
        let policy = seed_policy(&db, patient, 20).await;
        let invoice = service.create_invoice(consultation(patient, 1000)).await.unwrap();
        let claim = service
            .record_payment(invoice.id, pay(200, Some(policy.id)))
            .await
            .unwrap()
            .claim
            .unwrap();

        let approve = ClaimStatusUpdate {
            status: ClaimStatus::Approved,
            approved_amount: Some(Decimal::from(500)),
            notes: None,
        };
        let approved = service.update_claim_status(claim.id, approve).await.unwrap();
        assert!(approved.policy.is_none() && approved.invoice.is_none());

        let settled = service.update_claim_status(claim.id, to(ClaimStatus::Settled)).await.unwrap();
        assert_eq!(settled.claim.status, ClaimStatus::Settled);
        assert_eq!(settled.policy.unwrap().balance_remaining, Decimal::from(49_500));

        let stored = service.get_invoice(invoice.id).await.unwrap();
        assert_eq!(Some(&stored), settled.invoice.as_ref());
        assert_eq!(stored.paid_amount, Decimal::from(700));
        assert_eq!(stored.balance_due(), Decimal::from(300));
        assert_eq!(stored.payments.last().unwrap().method, PaymentMethod::Insurance);
        assert_eq!(
            db.repository::<InsurancePolicy>().get(policy.id).await.unwrap().balance_remaining,
            Decimal::from(49_500)
        );
    }

    #[tokio::test]
    async fn test_settlement_beyond_policy_balance_changes_nothing() {
        let db = Database::in_memory();
        let service = BillingService::new(db.clone(), BillingSettings::default());
        let patient = seed_patient(&db).await;
        let policy = seed_policy(&db, patient, 0).await;
        let invoice = service.create_invoice(consultation(patient, 80_000)).await.unwrap();
        let claim = db
            .repository::<InsuranceClaim>()
            .create(InsuranceClaim::submit(&policy, invoice.id, Decimal::from(60_000)))
            .await
            .unwrap();
        service.update_claim_status(claim.id, to(ClaimStatus::Approved)).await.unwrap();

        assert!(matches!(
            service.update_claim_status(claim.id, to(ClaimStatus::Settled)).await,
            Err(BillingError::Insurance(insurance_service::InsuranceError::CoverageExceeded { .. }))
        ));
        let stored = db.repository::<InsuranceClaim>().get(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Approved);
        assert_eq!(service.get_invoice(invoice.id).await.unwrap().paid_amount, Decimal::ZERO);
        assert!(matches!(
            service.update_claim_status(Uuid::new_v4(), to(ClaimStatus::Approved)).await,
            Err(BillingError::NotFound { entity: "Claim", .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_commit_writes_nothing() {
        let memory = MemoryStore::new();
        let seeding = Database::new(Arc::new(memory.clone()));
        let patient = seed_patient(&seeding).await;
        let policy = seed_policy(&seeding, patient, 20).await;
        let invoice = BillingService::new(seeding.clone(), BillingSettings::default())
            .create_invoice(consultation(patient, 1000))
            .await
            .unwrap();

        let failing: SharedStore = Arc::new(FailingCommits { inner: memory });
        let service = BillingService::new(Database::new(failing), BillingSettings::default());
        let result = service.record_payment(invoice.id, pay(200, Some(policy.id))).await;
        assert!(matches!(result, Err(BillingError::Database(_))));

        let stored = seeding.repository::<Invoice>().get(invoice.id).await.unwrap();
        assert_eq!(stored.paid_amount, Decimal::ZERO);
        assert_eq!(
            seeding.repository::<InsuranceClaim>().count(&ListQuery::new()).await.unwrap(),
            0
        );
    }
}
