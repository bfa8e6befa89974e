// Error codes implementation
// Stable codes returned to API clients and written to logs

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod billing {
    pub const INVALID_AMOUNT: &str = "BILLING_1001";
    pub const INVOICE_NOT_FOUND: &str = "BILLING_1002";
    pub const INVALID_INVOICE: &str = "BILLING_1003";
}

pub mod insurance {
    pub const INVALID_CO_PAY: &str = "INSURANCE_2001";
    pub const POLICY_NOT_ACTIVE: &str = "INSURANCE_2002";
    pub const COVERAGE_EXCEEDED: &str = "INSURANCE_2003";
    pub const INVALID_CLAIM_TRANSITION: &str = "INSURANCE_2004";
    pub const NOT_FOUND: &str = "INSURANCE_2005";
}

pub mod pharmacy {
    pub const INSUFFICIENT_STOCK: &str = "PHARMACY_3001";
    pub const MEDICINE_NOT_FOUND: &str = "PHARMACY_3002";
    pub const PRESCRIPTION_NOT_PENDING: &str = "PHARMACY_3003";
}

pub mod registry {
    pub const NOT_FOUND: &str = "REGISTRY_4001";
    pub const INVALID_STATE: &str = "REGISTRY_4002";
}

pub mod database {
    pub const NOT_FOUND: &str = "DB_5001";
    pub const CONFLICT: &str = "DB_5002";
    pub const PERSISTENCE_FAILURE: &str = "DB_5003";
    pub const CORRUPT_RECORD: &str = "DB_5004";
}

pub mod system {
    pub const CONFIGURATION: &str = "SYS_9001";
    pub const INTERNAL: &str = "SYS_9002";
}
