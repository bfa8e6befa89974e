//! Applying a payment to an invoice
//!
//! [`apply_payment`] is pure: it takes the current invoice (plus the policy
//! and the claims already raised for the invoice) and returns the new
//! invoice, the payment record and, when insurance covers part of what is
//! left, a new claim. [`credit_settlement`] books an insurer's payout
//! against the invoice its claim was raised for. Persisting the result is
//! the caller's job.

use crate::error::{BillingError, BillingResult};
use crate::models::{Invoice, Payment, PaymentMethod};
use chrono::{NaiveDate, Utc};
use insurance_service::{ensure_eligible, ClaimStatus, CoPaySplit, InsuranceClaim, InsurancePolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub policy_id: Option<Uuid>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub invoice: Invoice,
    pub payment: Payment,
    pub claim: Option<InsuranceClaim>,
    /// Split of the balance left after this payment, when a policy was given
    pub co_pay: Option<CoPaySplit>,
}

pub fn apply_payment(
    invoice: &Invoice,
    request: &PaymentRequest,
    policy: Option<&InsurancePolicy>,
    existing_claims: &[InsuranceClaim],
    today: NaiveDate,
) -> BillingResult<PaymentOutcome> {
    let amount = request.amount;
    if amount < Decimal::ZERO {
        return Err(BillingError::invalid_amount(amount, "payments cannot be negative"));
    }

    let remaining = invoice.balance_due();
    if amount > remaining {
        return Err(BillingError::invalid_amount(
            amount,
            format!("exceeds the balance due of {remaining}"),
        ));
    }

    if let Some(policy) = policy {
        ensure_eligible(policy, invoice.patient_id, today)?;
    }

    let mut updated = invoice.clone();
    updated.paid_amount += amount;
    updated.status = updated.derive_status(today);

    let uncovered = remaining - amount;
    let mut co_pay = None;
    let mut claim = None;
    if let Some(policy) = policy {
        let split = policy.co_pay(uncovered)?;
        let already_claimed = existing_claims
            .iter()
            .any(|c| c.invoice_id == invoice.id && c.status != ClaimStatus::Rejected);
        if split.insurer_portion > Decimal::ZERO && !already_claimed {
            claim = Some(InsuranceClaim::submit(policy, invoice.id, split.insurer_portion));
        }
        co_pay = Some(split);
    }

    let payment = Payment {
        id: Uuid::new_v4(),
        amount,
        method: request.method,
        reference: request.reference.clone(),
        policy_id: policy.map(|p| p.id),
        claim_id: claim.as_ref().map(|c| c.id),
        received_at: Utc::now(),
    };
    updated.payments.push(payment.clone());

    Ok(PaymentOutcome {
        invoice: updated,
        payment,
        claim,
        co_pay,
    })
}

/// Credit `invoice` with the payout of a settled `claim`, capped at the
/// balance due. `None` when nothing is owed.
pub fn credit_settlement(invoice: &Invoice, claim: &InsuranceClaim, today: NaiveDate) -> Option<Invoice> {
    let amount = claim.payable_amount().min(invoice.balance_due());
    if amount <= Decimal::ZERO {
        return None;
    }

    let mut updated = invoice.clone();
    updated.paid_amount += amount;
    updated.status = updated.derive_status(today);
    updated.payments.push(Payment {
        id: Uuid::new_v4(),
        amount,
        method: PaymentMethod::Insurance,
        reference: Some(claim.claim_id.clone()),
        policy_id: Some(claim.policy_id),
        claim_id: Some(claim.id),
        received_at: Utc::now(),
    });
    Some(updated)
}
