// Collections of the entity store
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every collection the store holds. Each maps to one SQLite table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Patients,
    Doctors,
    Appointments,
    Admissions,
    LabOrders,
    Medicines,
    Prescriptions,
    Invoices,
    InsuranceCompanies,
    InsurancePolicies,
    InsuranceClaims,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::Patients,
        Collection::Doctors,
        Collection::Appointments,
        Collection::Admissions,
        Collection::LabOrders,
        Collection::Medicines,
        Collection::Prescriptions,
        Collection::Invoices,
        Collection::InsuranceCompanies,
        Collection::InsurancePolicies,
        Collection::InsuranceClaims,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Patients => "patients",
            Collection::Doctors => "doctors",
            Collection::Appointments => "appointments",
            Collection::Admissions => "admissions",
            Collection::LabOrders => "lab_orders",
            Collection::Medicines => "medicines",
            Collection::Prescriptions => "prescriptions",
            Collection::Invoices => "invoices",
            Collection::InsuranceCompanies => "insurance_companies",
            Collection::InsurancePolicies => "insurance_policies",
            Collection::InsuranceClaims => "insurance_claims",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
