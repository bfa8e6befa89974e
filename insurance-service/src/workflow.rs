// Claim workflow: status transitions and the settlement debit
use crate::error::{InsuranceError, InsuranceResult};
use crate::models::{ClaimStatus, InsuranceClaim, InsurancePolicy};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusUpdate {
    pub status: ClaimStatus,
    /// Only meaningful when approving; defaults to the claimed amount
    pub approved_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimUpdateOutcome {
    pub claim: InsuranceClaim,
    /// The debited policy, when the claim settled
    pub policy: Option<InsurancePolicy>,
}

/// Apply `update` to `claim`. Settling debits the payable amount from
/// `policy`, which must be the claim's policy.
///
/// Nothing is persisted; the caller writes the claim and, when returned,
/// the policy in one batch while holding both locks.
pub fn transition_claim(
    mut claim: InsuranceClaim,
    policy: &InsurancePolicy,
    update: ClaimStatusUpdate,
    now: DateTime<Utc>,
) -> InsuranceResult<ClaimUpdateOutcome> {
    if !claim.status.can_transition_to(update.status) {
        return Err(InsuranceError::InvalidTransition {
            from: claim.status.to_string(),
            to: update.status.to_string(),
        });
    }
    if update.approved_amount.is_some() && update.status != ClaimStatus::Approved {
        return Err(InsuranceError::Validation(
            "approvedAmount can only be set when approving a claim".to_string(),
        ));
    }

    let mut debited = None;
    match update.status {
        ClaimStatus::Approved => {
            let approved = update.approved_amount.unwrap_or(claim.claim_amount);
            if approved < Decimal::ZERO || approved > claim.claim_amount {
                return Err(InsuranceError::InvalidAmount(approved));
            }
            claim.approved_amount = Some(approved);
        }
        ClaimStatus::Settled => {
            let amount = claim.payable_amount();
            if amount > policy.balance_remaining {
                return Err(InsuranceError::CoverageExceeded {
                    requested: amount,
                    available: policy.balance_remaining,
                });
            }
            let mut policy = policy.clone();
            policy.balance_remaining -= amount;
            debited = Some(policy);
        }
        ClaimStatus::Submitted | ClaimStatus::UnderReview | ClaimStatus::Rejected => {}
    }

    claim.status = update.status;
    claim.updated_at = Some(now);
    if let Some(notes) = update.notes {
        claim.notes = Some(notes);
    }
    Ok(ClaimUpdateOutcome {
        claim,
        policy: debited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoverageType, PolicyStatus};
    use chrono::{Duration, NaiveDate};
    use uuid::Uuid;

    fn policy(balance: i64) -> InsurancePolicy {
        InsurancePolicy {
            id: Uuid::new_v4(),
            policy_id: "POL-20261019-000007".into(),
            patient_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            company_name: "Star Health".into(),
            policy_number: "SH-1001".into(),
            coverage_type: CoverageType::CoPay,
            coverage_limit: Decimal::from(5_000),
            co_pay_percent: Decimal::from(20),
            balance_remaining: Decimal::from(balance),
            expiry_date: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            status: PolicyStatus::Active,
        }
    }

    fn to(status: ClaimStatus) -> ClaimStatusUpdate {
        ClaimStatusUpdate {
            status,
            approved_amount: None,
            notes: None,
        }
    }

    #[test]
    fn test_approve_then_settle_debits_policy() {
        let policy = policy(5_000);
        let claim = InsuranceClaim::submit(&policy, Uuid::new_v4(), Decimal::from(640));
        let now = Utc::now();

        let review = transition_claim(claim, &policy, to(ClaimStatus::UnderReview), now).unwrap();
        let approved = transition_claim(
            review.claim,
            &policy,
            ClaimStatusUpdate {
                status: ClaimStatus::Approved,
                approved_amount: Some(Decimal::from(500)),
                notes: Some("room rent capped".into()),
            },
            now,
        )
        .unwrap();
        assert_eq!(approved.claim.approved_amount, Some(Decimal::from(500)));
        assert!(approved.policy.is_none());

        let later = now + Duration::days(3);
        let settled = transition_claim(approved.claim, &policy, to(ClaimStatus::Settled), later).unwrap();
        assert_eq!(settled.claim.status, ClaimStatus::Settled);
        assert_eq!(settled.claim.updated_at, Some(later));
        assert_eq!(settled.claim.notes.as_deref(), Some("room rent capped"));
        assert_eq!(settled.policy.unwrap().balance_remaining, Decimal::from(4_500));

        assert!(matches!(
            transition_claim(settled.claim, &policy, to(ClaimStatus::Settled), later),
            Err(InsuranceError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_settlement_beyond_balance() {
        let policy = policy(5_000);
        let claim = InsuranceClaim::submit(&policy, Uuid::new_v4(), Decimal::from(6_000));
        let approved = transition_claim(claim, &policy, to(ClaimStatus::Approved), Utc::now()).unwrap();
        assert!(matches!(
            transition_claim(approved.claim, &policy, to(ClaimStatus::Settled), Utc::now()),
            Err(InsuranceError::CoverageExceeded { .. })
        ));
    }

    #[test]
    fn test_approved_amount_rules() {
        let policy = policy(5_000);
        let claim = InsuranceClaim::submit(&policy, Uuid::new_v4(), Decimal::from(300));

        let too_much = ClaimStatusUpdate {
            status: ClaimStatus::Approved,
            approved_amount: Some(Decimal::from(301)),
            notes: None,
        };
        assert!(matches!(
            transition_claim(claim.clone(), &policy, too_much, Utc::now()),
            Err(InsuranceError::InvalidAmount(_))
        ));

        let on_reject = ClaimStatusUpdate {
            status: ClaimStatus::Rejected,
            approved_amount: Some(Decimal::from(10)),
            notes: None,
        };
        assert!(matches!(
            transition_claim(claim, &policy, on_reject, Utc::now()),
            Err(InsuranceError::Validation(_))
        ));
    }
}
