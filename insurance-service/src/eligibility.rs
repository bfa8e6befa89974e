use crate::error::{InsuranceError, InsuranceResult};
use crate::models::{InsurancePolicy, PolicyStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Why a policy cannot cover a new claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    Status(PolicyStatus),
    Expired(NaiveDate),
    CoverageExhausted,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::Status(status) => write!(f, "policy is {status}"),
            Ineligibility::Expired(date) => write!(f, "policy expired on {date}"),
            Ineligibility::CoverageExhausted => f.write_str("no coverage balance remaining"),
        }
    }
}

/// A policy is usable while active, not past its expiry date, and with
/// coverage left. The expiry date itself is still covered.
pub fn check_eligibility(policy: &InsurancePolicy, today: NaiveDate) -> Result<(), Ineligibility> {
    if policy.expiry_date < today {
        return Err(Ineligibility::Expired(policy.expiry_date));
    }
    if policy.status != PolicyStatus::Active {
        return Err(Ineligibility::Status(policy.status));
    }
    if policy.balance_remaining <= Decimal::ZERO {
        return Err(Ineligibility::CoverageExhausted);
    }
    Ok(())
}

/// Eligibility plus ownership: the policy must belong to `patient_id`
pub fn ensure_eligible(
    policy: &InsurancePolicy,
    patient_id: Uuid,
    today: NaiveDate,
) -> InsuranceResult<()> {
    if policy.patient_id != patient_id {
        return Err(InsuranceError::Validation(format!(
            "policy {} does not belong to this patient",
            policy.policy_number
        )));
    }
    check_eligibility(policy, today).map_err(|reason| InsuranceError::PolicyNotActive {
        policy_number: policy.policy_number.clone(),
        reason: reason.to_string(),
    })
}
