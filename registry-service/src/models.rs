use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{generate_business_id, Collection, Entity};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

lazy_static! {
    static ref TIME_REGEX: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("time pattern");
    static ref BLOOD_GROUP_REGEX: Regex = Regex::new(r"^(A|B|AB|O)[+-]$").expect("blood group pattern");
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `PAT-...`
    #[serde(default)]
    pub patient_id: String,
    pub name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    #[serde(default = "Utc::now")]
    pub registered_at: DateTime<Utc>,
}

impl Entity for Patient {
    const COLLECTION: Collection = Collection::Patients;
    const READ_ONLY_FIELDS: &'static [&'static str] = &["patientId", "registeredAt"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.patient_id)
    }

    fn prepare_insert(&mut self) {
        if self.patient_id.is_empty() {
            self.patient_id = generate_business_id("PAT");
        }
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.name, "name")?;
        if let Some(group) = &self.blood_group {
            if !BLOOD_GROUP_REGEX.is_match(group) {
                return Err(format!("unknown blood group {group}"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DoctorStatus {
    #[default]
    Available,
    OnLeave,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub consultation_fee: Decimal,
    #[serde(default)]
    pub status: DoctorStatus,
}

impl Entity for Doctor {
    const COLLECTION: Collection = Collection::Doctors;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.name, "name")?;
        require(&self.specialization, "specialization")?;
        if self.consultation_fee < Decimal::ZERO {
            return Err("consultationFee cannot be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentKind {
    #[default]
    Opd,
    FollowUp,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `APT-...`
    #[serde(default)]
    pub appointment_id: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// `HH:MM`, 24-hour
    pub time: String,
    #[serde(default)]
    pub kind: AppointmentKind,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl Entity for Appointment {
    const COLLECTION: Collection = Collection::Appointments;
    /// Slot and status changes go through `RegistryService::reschedule_appointment`
    const READ_ONLY_FIELDS: &'static [&'static str] =
        &["appointmentId", "patientId", "doctorId", "date", "time", "status"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.appointment_id)
    }

    fn prepare_insert(&mut self) {
        if self.appointment_id.is_empty() {
            self.appointment_id = generate_business_id("APT");
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !TIME_REGEX.is_match(&self.time) {
            return Err(format!("time must be HH:MM, got {}", self.time));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionStatus {
    #[default]
    Admitted,
    Discharged,
}

/// In-patient stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `ADM-...`
    #[serde(default)]
    pub admission_id: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub ward: String,
    pub bed_number: String,
    #[serde(default = "Utc::now")]
    pub admitted_at: DateTime<Utc>,
    pub discharged_at: Option<DateTime<Utc>>,
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub status: AdmissionStatus,
}

impl Entity for Admission {
    const COLLECTION: Collection = Collection::Admissions;
    const READ_ONLY_FIELDS: &'static [&'static str] = &[
        "admissionId",
        "patientId",
        "ward",
        "bedNumber",
        "status",
        "dischargedAt",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.admission_id)
    }

    fn prepare_insert(&mut self) {
        if self.admission_id.is_empty() {
            self.admission_id = generate_business_id("ADM");
        }
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.ward, "ward")?;
        require(&self.bed_number, "bedNumber")?;
        match (self.status, self.discharged_at) {
            (AdmissionStatus::Admitted, Some(_)) => {
                Err("an admitted patient has no discharge time".to_string())
            }
            (AdmissionStatus::Discharged, None) => {
                Err("a discharged admission needs dischargedAt".to_string())
            }
            (_, Some(discharged)) if discharged < self.admitted_at => {
                Err("dischargedAt is before admittedAt".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabPriority {
    #[default]
    Routine,
    Urgent,
    Stat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabOrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabOrder {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Business id, `LAB-...`
    #[serde(default)]
    pub order_id: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub test_name: String,
    #[serde(default)]
    pub priority: LabPriority,
    #[serde(default)]
    pub status: LabOrderStatus,
    pub result: Option<String>,
    #[serde(default = "Utc::now")]
    pub ordered_at: DateTime<Utc>,
}

impl Entity for LabOrder {
    const COLLECTION: Collection = Collection::LabOrders;
    const READ_ONLY_FIELDS: &'static [&'static str] = &["orderId"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn business_id(&self) -> Option<&str> {
        Some(&self.order_id)
    }

    fn prepare_insert(&mut self) {
        if self.order_id.is_empty() {
            self.order_id = generate_business_id("LAB");
        }
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.test_name, "testName")
    }
}
