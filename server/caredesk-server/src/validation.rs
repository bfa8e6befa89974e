//! Request validation for payloads accepted by the API
//!
//! Handlers call [`RequestValidation::validate`] before handing a payload to
//! a service, so malformed input is rejected with a 400 and a consistent
//! message. Services still enforce their own business rules.

use crate::error::ApiError;
use billing_service::{max_amount, NewInvoice, PaymentRequest};
use insurance_service::{ClaimStatusUpdate, InsuranceCompany, RegisterPolicyRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Trait for validating request payloads
pub trait RequestValidation {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Fail with a validation error unless `$predicate` holds
#[macro_export]
macro_rules! validate_field {
    ($predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Non-empty after trimming
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!(!$field.trim().is_empty(), $message);
    };
}

/// Non-nil UUID
#[macro_export]
macro_rules! validate_uuid {
    ($field:expr, $message:expr) => {
        $crate::validate_field!(!$field.is_nil(), $message);
    };
}

/// Basic shape check only
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field.contains('@') && $field.contains('.'), $message);
    };
}

/// Co-pay preview request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoPayRequest {
    pub policy_id: Uuid,
    pub amount: Decimal,
}

impl RequestValidation for CoPayRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.policy_id, "policyId is required");
        validate_field!(self.amount >= Decimal::ZERO, "amount must not be negative");
        validate_field!(self.amount <= max_amount(), "amount is too large");
        Ok(())
    }
}

impl RequestValidation for PaymentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!(self.amount >= Decimal::ZERO, "amount must not be negative");
        validate_field!(self.amount <= max_amount(), "amount is too large");
        if let Some(policy_id) = self.policy_id {
            validate_uuid!(policy_id, "policyId must not be nil");
        }
        Ok(())
    }
}

impl RequestValidation for NewInvoice {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.patient_id, "patientId is required");
        validate_field!(!self.items.is_empty(), "an invoice needs at least one item");
        for item in &self.items {
            validate_required!(item.description, "every item needs a description");
            validate_field!(item.quantity >= 1, "item quantity must be at least 1");
            validate_field!(item.unit_price >= Decimal::ZERO, "unitPrice must not be negative");
            validate_field!(item.unit_price <= max_amount(), "unitPrice is too large");
        }
        validate_field!(self.tax >= Decimal::ZERO, "tax must not be negative");
        validate_field!(self.discount >= Decimal::ZERO, "discount must not be negative");
        validate_field!(
            self.tax <= max_amount() && self.discount <= max_amount(),
            "tax and discount are too large"
        );
        Ok(())
    }
}

impl RequestValidation for InsuranceCompany {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "name is required");
        validate_required!(self.code, "code is required");
        if let Some(email) = &self.contact_email {
            validate_email!(email, "contactEmail is not a valid email address");
        }
        Ok(())
    }
}

impl RequestValidation for RegisterPolicyRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.patient_id, "patientId is required");
        validate_uuid!(self.company_id, "companyId is required");
        validate_required!(self.policy_number, "policyNumber is required");
        validate_field!(self.coverage_limit >= Decimal::ZERO, "coverageLimit must not be negative");
        Ok(())
    }
}

impl RequestValidation for ClaimStatusUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(approved) = self.approved_amount {
            validate_field!(approved >= Decimal::ZERO, "approvedAmount must not be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_co_pay_request() {
        let ok: CoPayRequest =
            serde_json::from_value(json!({"policyId": Uuid::new_v4(), "amount": "800"})).unwrap();
        assert!(ok.validate().is_ok());

        let negative: CoPayRequest =
            serde_json::from_value(json!({"policyId": Uuid::new_v4(), "amount": "-1"})).unwrap();
        assert!(negative.validate().is_err());

        let nil: CoPayRequest =
            serde_json::from_value(json!({"policyId": Uuid::nil(), "amount": "1"})).unwrap();
        assert!(nil.validate().is_err());
    }

    #[test]
    fn test_invoice_request() {
        let mut invoice: NewInvoice = serde_json::from_value(json!({
            "patientId": Uuid::new_v4(),
            "items": [{"description": "Consultation", "quantity": 1, "unitPrice": "500"}]
        }))
        .unwrap();
        assert!(invoice.validate().is_ok());

        invoice.items[0].description = "  ".into();
        assert!(invoice.validate().is_err());

        invoice.items[0].description = "Consultation".into();
        invoice.items[0].unit_price = Decimal::MAX;
        assert!(invoice.validate().is_err());

        invoice.items.clear();
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn test_policy_request_needs_number() {
        let mut request: RegisterPolicyRequest = serde_json::from_value(json!({
            "patientId": Uuid::new_v4(),
            "companyId": Uuid::new_v4(),
            "policyNumber": "HDF-1001",
            "coverageType": "co-pay",
            "coverageLimit": "100000",
            "coPayPercent": "20",
            "expiryDate": "2099-12-31"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        request.policy_number = " ".into();
        assert!(request.validate().is_err());
    }
}
