use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{generate_business_id, Collection, Entity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn default_true() -> bool {
    true
}

/// Insurance provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceCompany {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    /// Short payer code, unique across providers
    pub code: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Entity for InsuranceCompany {
    const COLLECTION: Collection = Collection::InsuranceCompanies;
    const READ_ONLY_FIELDS: &'static [&'static str] = &["code"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.code.trim().is_empty() {
            return Err("code is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageType {
    Full,
    Partial,
    CoPay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyStatus {
    #[default]
    Active,
    Expired,
    Suspended,
    Cancelled,
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyStatus::Active => "active",
            PolicyStatus::Expired => "expired",
            PolicyStatus::Suspended => "suspended",
            PolicyStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A patient's insurance policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePolicy {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `POL-...`
    #[serde(default)]
    pub policy_id: String,
    pub patient_id: Uuid,
    pub company_id: Uuid,
    #[serde(default)]
    pub company_name: String,
    pub policy_number: String,
    pub coverage_type: CoverageType,
    pub coverage_limit: Decimal,
    /// Share of each covered balance the patient pays, 0 to 100
    pub co_pay_percent: Decimal,
    /// Coverage left; debited when claims settle
    #[serde(default)]
    pub balance_remaining: Decimal,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub status: PolicyStatus,
}

impl Entity for InsurancePolicy {
    const COLLECTION: Collection = Collection::InsurancePolicies;
    const READ_ONLY_FIELDS: &'static [&'static str] = &[
        "policyId",
        "patientId",
        "companyId",
        "companyName",
        "policyNumber",
        "balanceRemaining",
    ];
    const DATE_DERIVED_FIELDS: &'static [&'static str] = &["status"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.policy_id)
    }

    fn prepare_insert(&mut self) {
        if self.policy_id.is_empty() {
            self.policy_id = generate_business_id("POL");
        }
    }

    fn refresh_derived(&mut self) -> Result<(), String> {
        self.refresh_for_date(Utc::now().date_naive());
        Ok(())
    }

    /// Active policies lapse after their expiry date. Suspended and
    /// cancelled are set by staff and left alone.
    fn refresh_for_date(&mut self, today: NaiveDate) {
        if self.status == PolicyStatus::Active && self.expiry_date < today {
            self.status = PolicyStatus::Expired;
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.policy_number.trim().is_empty() {
            return Err("policyNumber is required".to_string());
        }
        if self.co_pay_percent < Decimal::ZERO || self.co_pay_percent > Decimal::ONE_HUNDRED {
            return Err(format!(
                "coPayPercent must be between 0 and 100, got {}",
                self.co_pay_percent
            ));
        }
        if self.coverage_limit < Decimal::ZERO {
            return Err("coverageLimit cannot be negative".to_string());
        }
        if self.balance_remaining < Decimal::ZERO {
            return Err("balanceRemaining cannot be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStatus {
    #[default]
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Settled,
}

impl ClaimStatus {
    /// Allowed moves of the claim workflow
    pub fn can_transition_to(self, next: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, next),
            (Submitted, UnderReview)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Approved, Settled)
        )
    }

    /// Still waiting on the insurer
    pub fn is_pending(self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::UnderReview)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::UnderReview => "under-review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Settled => "settled",
        };
        f.write_str(s)
    }
}

/// Claim against a policy for the insurer's share of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceClaim {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `CLM-...`
    #[serde(default)]
    pub claim_id: String,
    pub patient_id: Uuid,
    /// Provider name at the time the claim was raised
    pub insurance_company: String,
    pub policy_id: Uuid,
    pub policy_number: String,
    pub invoice_id: Uuid,
    pub claim_amount: Decimal,
    pub approved_amount: Option<Decimal>,
    #[serde(default)]
    pub status: ClaimStatus,
    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl InsuranceClaim {
    /// New `submitted` claim for `amount` of an invoice
    pub fn submit(policy: &InsurancePolicy, invoice_id: Uuid, amount: Decimal) -> Self {
        let mut claim = Self {
            id: Uuid::new_v4(),
            claim_id: String::new(),
            patient_id: policy.patient_id,
            insurance_company: policy.company_name.clone(),
            policy_id: policy.id,
            policy_number: policy.policy_number.clone(),
            invoice_id,
            claim_amount: amount,
            approved_amount: None,
            status: ClaimStatus::Submitted,
            submitted_at: Utc::now(),
            updated_at: None,
            notes: None,
        };
        claim.prepare_insert();
        claim
    }

    /// Amount the policy is debited when this claim settles
    pub fn payable_amount(&self) -> Decimal {
        self.approved_amount.unwrap_or(self.claim_amount)
    }
}

impl Entity for InsuranceClaim {
    const COLLECTION: Collection = Collection::InsuranceClaims;
    const READ_ONLY_FIELDS: &'static [&'static str] = &[
        "claimId",
        "status",
        "approvedAmount",
        "claimAmount",
        "policyId",
        "invoiceId",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.claim_id)
    }

    fn prepare_insert(&mut self) {
        if self.claim_id.is_empty() {
            self.claim_id = generate_business_id("CLM");
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.claim_amount < Decimal::ZERO {
            return Err("claimAmount cannot be negative".to_string());
        }
        if let Some(approved) = self.approved_amount {
            if approved < Decimal::ZERO || approved > self.claim_amount {
                return Err("approvedAmount must be between 0 and claimAmount".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claim_transitions() {
        use ClaimStatus::*;
        assert!(Submitted.can_transition_to(UnderReview));
        assert!(Submitted.can_transition_to(Approved));
        assert!(UnderReview.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Settled));
        assert!(!Submitted.can_transition_to(Settled));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Settled.can_transition_to(Submitted));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn test_policy_wire_format() {
        let policy: InsurancePolicy = serde_json::from_value(json!({
            "patientId": Uuid::new_v4(),
            "companyId": Uuid::new_v4(),
            "policyNumber": "HP-7781",
            "coverageType": "co-pay",
            "coverageLimit": "50000",
            "coPayPercent": 20,
            "expiryDate": "2027-03-31"
        }))
        .unwrap();
        assert_eq!(policy.coverage_type, CoverageType::CoPay);
        assert_eq!(policy.status, PolicyStatus::Active);
        assert_eq!(policy.co_pay_percent, Decimal::from(20));

        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["coverageType"], "co-pay");
        assert_eq!(value["expiryDate"], "2027-03-31");
    }

    #[test]
    fn test_policy_validation() {
        let mut policy: InsurancePolicy = serde_json::from_value(json!({
            "patientId": Uuid::new_v4(),
            "companyId": Uuid::new_v4(),
            "policyNumber": "HP-1",
            "coverageType": "full",
            "coverageLimit": "1000",
            "coPayPercent": "0",
            "expiryDate": "2027-01-01"
        }))
        .unwrap();
        assert!(policy.validate().is_ok());
        policy.co_pay_percent = Decimal::from(101);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_policy_lapses_after_expiry_date() {
        let mut policy: InsurancePolicy = serde_json::from_value(json!({
            "patientId": Uuid::new_v4(),
            "companyId": Uuid::new_v4(),
            "policyNumber": "HP-2",
            "coverageType": "full",
            "coverageLimit": "1000",
            "coPayPercent": "0",
            "expiryDate": "2026-10-19"
        }))
        .unwrap();
        let expiry = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        policy.refresh_for_date(expiry);
        assert_eq!(policy.status, PolicyStatus::Active);
        policy.refresh_for_date(expiry.succ_opt().unwrap());
        assert_eq!(policy.status, PolicyStatus::Expired);

        policy.status = PolicyStatus::Suspended;
        policy.refresh_for_date(expiry.succ_opt().unwrap());
        assert_eq!(policy.status, PolicyStatus::Suspended);
    }
}
