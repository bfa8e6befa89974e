use crate::copay::CoPaySplit;
use crate::eligibility::check_eligibility;
use crate::error::{InsuranceError, InsuranceResult};
use crate::models::*;
use chrono::{NaiveDate, Utc};
use database_layer::{scoped_lock_key, Collection, Database, Entity, ListQuery};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// Fields accepted when registering a policy
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPolicyRequest {
    pub patient_id: Uuid,
    pub company_id: Uuid,
    pub policy_number: String,
    pub coverage_type: CoverageType,
    pub coverage_limit: Decimal,
    pub co_pay_percent: Decimal,
    /// Defaults to the full coverage limit
    pub balance_remaining: Option<Decimal>,
    pub expiry_date: NaiveDate,
    pub status: Option<PolicyStatus>,
}

/// Co-pay preview for a policy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoPayQuote {
    pub policy_id: Uuid,
    pub policy_number: String,
    pub co_pay_percent: Decimal,
    pub eligible: bool,
    pub ineligible_reason: Option<String>,
    #[serde(flatten)]
    pub split: CoPaySplit,
}

/// Insurance service
#[derive(Debug, Clone)]
pub struct InsuranceService {
    db: Database,
}

impl InsuranceService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register an insurance provider
    #[instrument(skip(self, company), fields(code = %company.code))]
    pub async fn register_company(
        &self,
        company: InsuranceCompany,
    ) -> InsuranceResult<InsuranceCompany> {
        let companies = self.db.repository::<InsuranceCompany>();
        let code = company.code.trim().to_string();
        if code.is_empty() || company.name.trim().is_empty() {
            return Err(InsuranceError::Validation(
                "provider name and code are required".to_string(),
            ));
        }
        let _lock = self
            .db
            .locks()
            .acquire_all([scoped_lock_key(InsuranceCompany::COLLECTION, &format!("code:{code}"))])
            .await;
        let duplicates = companies
            .count(&ListQuery::new().filter("code", code.clone()))
            .await?;
        if duplicates > 0 {
            return Err(InsuranceError::Validation(format!(
                "provider code {code} is already registered"
            )));
        }

        let created = companies
            .create(InsuranceCompany { code, ..company })
            .await?;
        info!(company_id = %created.id, "Insurance provider registered");
        Ok(created)
    }

    /// Register a policy for an existing patient with an active provider
    #[instrument(skip(self, request), fields(patient_id = %request.patient_id, company_id = %request.company_id))]
    pub async fn register_policy(
        &self,
        request: RegisterPolicyRequest,
    ) -> InsuranceResult<InsurancePolicy> {
        if request.co_pay_percent < Decimal::ZERO || request.co_pay_percent > Decimal::ONE_HUNDRED {
            return Err(InsuranceError::InvalidCoPay(request.co_pay_percent));
        }
        if request.coverage_limit < Decimal::ZERO {
            return Err(InsuranceError::InvalidAmount(request.coverage_limit));
        }
        let balance = request.balance_remaining.unwrap_or(request.coverage_limit);
        if balance < Decimal::ZERO || balance > request.coverage_limit {
            return Err(InsuranceError::Validation(
                "balanceRemaining must be between 0 and coverageLimit".to_string(),
            ));
        }

        let company = self
            .db
            .repository::<InsuranceCompany>()
            .find(request.company_id)
            .await?
            .ok_or(InsuranceError::NotFound {
                entity: "Insurance company",
                id: request.company_id,
            })?;
        if !company.is_active {
            return Err(InsuranceError::Validation(format!(
                "provider {} is not active",
                company.name
            )));
        }
        if self
            .db
            .store()
            .get(Collection::Patients, request.patient_id)
            .await?
            .is_none()
        {
            return Err(InsuranceError::NotFound {
                entity: "Patient",
                id: request.patient_id,
            });
        }

        let policies = self.db.repository::<InsurancePolicy>();
        let policy_number = request.policy_number.trim().to_string();
        let _lock = self
            .db
            .locks()
            .acquire_all([scoped_lock_key(
                InsurancePolicy::COLLECTION,
                &format!("number:{}:{policy_number}", company.id),
            )])
            .await;
        let duplicates = policies
            .count(
                &ListQuery::new()
                    .filter("companyId", company.id.to_string())
                    .filter("policyNumber", policy_number.clone()),
            )
            .await?;
        if duplicates > 0 {
            return Err(InsuranceError::Validation(format!(
                "policy number {policy_number} already exists for {}",
                company.name
            )));
        }

        let policy = policies
            .create(InsurancePolicy {
                id: Uuid::new_v4(),
                policy_id: String::new(),
                patient_id: request.patient_id,
                company_id: company.id,
                company_name: company.name,
                policy_number,
                coverage_type: request.coverage_type,
                coverage_limit: request.coverage_limit,
                co_pay_percent: request.co_pay_percent,
                balance_remaining: balance,
                expiry_date: request.expiry_date,
                status: request.status.unwrap_or_default(),
            })
            .await?;
        info!(policy_id = %policy.policy_id, "Insurance policy registered");
        Ok(policy)
    }

    pub async fn get_policy(&self, policy_id: Uuid) -> InsuranceResult<InsurancePolicy> {
        self.db
            .repository::<InsurancePolicy>()
            .find(policy_id)
            .await?
            .ok_or(InsuranceError::NotFound {
                entity: "Policy",
                id: policy_id,
            })
    }

    pub async fn patient_policies(&self, patient_id: Uuid) -> InsuranceResult<Vec<InsurancePolicy>> {
        Ok(self
            .db
            .repository::<InsurancePolicy>()
            .list(&ListQuery::new().filter("patientId", patient_id.to_string()))
            .await?)
    }

    /// Preview the patient/insurer split of `amount` without recording anything
    pub async fn quote_co_pay(&self, policy_id: Uuid, amount: Decimal) -> InsuranceResult<CoPayQuote> {
        let policy = self.get_policy(policy_id).await?;
        let split = policy.co_pay(amount)?;
        let eligibility = check_eligibility(&policy, Utc::now().date_naive());
        Ok(CoPayQuote {
            policy_id: policy.id,
            policy_number: policy.policy_number,
            co_pay_percent: policy.co_pay_percent,
            eligible: eligibility.is_ok(),
            ineligible_reason: eligibility.err().map(|reason| reason.to_string()),
            split,
        })
    }
}
