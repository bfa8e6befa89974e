use crate::error::{RegistryError, RegistryResult};
use crate::models::*;
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{scoped_lock_key, Database, Entity, ListQuery, LockKey, WriteBatch};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DischargeRequest {
    /// Defaults to now
    pub discharged_at: Option<DateTime<Utc>>,
    /// Final diagnosis, replacing the admitting one when given
    pub diagnosis: Option<String>,
}

/// Changes to a booked appointment. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentChange {
    pub doctor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub ward: String,
    pub bed_number: String,
}

fn bed_lock(ward: &str, bed_number: &str) -> LockKey {
    scoped_lock_key(Admission::COLLECTION, &format!("bed:{ward}:{bed_number}"))
}

/// Registry workflows beyond plain CRUD
#[derive(Debug, Clone)]
pub struct RegistryService {
    db: Database,
}

impl RegistryService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch<T: Entity>(&self, id: Uuid, entity: &'static str) -> RegistryResult<T> {
        self.db
            .repository::<T>()
            .find(id)
            .await?
            .ok_or(RegistryError::NotFound { entity, id })
    }

    /// Book a slot with a doctor who is not on leave and has nothing else
    /// scheduled at the same date and time
    #[instrument(skip(self, appointment), fields(doctor_id = %appointment.doctor_id))]
    pub async fn book_appointment(&self, appointment: Appointment) -> RegistryResult<Appointment> {
        self.fetch::<Patient>(appointment.patient_id, "Patient").await?;
        let _lock = self
            .db
            .locks()
            .acquire(Doctor::COLLECTION, appointment.doctor_id)
            .await;
        let appointment = Appointment {
            status: AppointmentStatus::Scheduled,
            ..appointment
        };
        self.check_slot(&appointment).await?;

        let booked = self.db.repository::<Appointment>().create(appointment).await?;
        info!(appointment_id = %booked.appointment_id, "Appointment booked");
        Ok(booked)
    }

    /// Move, reassign, cancel or complete an appointment. A result that is
    /// still scheduled goes through the same checks as a new booking.
    #[instrument(skip(self, change))]
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        change: AppointmentChange,
    ) -> RegistryResult<Appointment> {
        let seen = self.fetch::<Appointment>(appointment_id, "Appointment").await?;
        let doctor_id = change.doctor_id.unwrap_or(seen.doctor_id);
        let _locks = self
            .db
            .locks()
            .acquire_all([
                (Appointment::COLLECTION, appointment_id),
                (Doctor::COLLECTION, doctor_id),
            ])
            .await;

        let current = self.fetch::<Appointment>(appointment_id, "Appointment").await?;
        if change.doctor_id.is_none() && current.doctor_id != seen.doctor_id {
            return Err(RegistryError::InvalidState(format!(
                "appointment {} was reassigned while updating, retry",
                current.appointment_id
            )));
        }
        let updated = Appointment {
            doctor_id,
            date: change.date.unwrap_or(current.date),
            time: change.time.unwrap_or_else(|| current.time.clone()),
            status: change.status.unwrap_or(current.status),
            notes: change.notes.or_else(|| current.notes.clone()),
            ..current.clone()
        };
        updated.validate().map_err(RegistryError::Validation)?;
        if updated.status == AppointmentStatus::Scheduled && !same_slot(&current, &updated) {
            self.check_slot(&updated).await?;
        }

        let mut batch = WriteBatch::new();
        batch.update(&updated)?;
        self.db.commit(batch).await?;
        info!(appointment_id = %updated.appointment_id, "Appointment updated");
        Ok(updated)
    }

    /// The doctor is available and no other scheduled appointment holds the slot.
    /// Callers hold the doctor's lock.
    async fn check_slot(&self, appointment: &Appointment) -> RegistryResult<()> {
        let doctor = self.fetch::<Doctor>(appointment.doctor_id, "Doctor").await?;
        if doctor.status == DoctorStatus::OnLeave {
            return Err(RegistryError::InvalidState(format!("{} is on leave", doctor.name)));
        }

        let clashes = self
            .db
            .repository::<Appointment>()
            .list(
                &ListQuery::new()
                    .filter("doctorId", doctor.id.to_string())
                    .filter("date", appointment.date.to_string())
                    .filter("time", appointment.time.clone())
                    .filter("status", "scheduled"),
            )
            .await?;
        if clashes.iter().any(|other| other.id != appointment.id) {
            return Err(RegistryError::InvalidState(format!(
                "{} already has an appointment on {} at {}",
                doctor.name, appointment.date, appointment.time
            )));
        }
        Ok(())
    }

    /// Admit a patient to a free bed. A patient can hold one admission at a time.
    #[instrument(skip(self, admission), fields(patient_id = %admission.patient_id))]
    pub async fn admit(&self, admission: Admission) -> RegistryResult<Admission> {
        let _locks = self
            .db
            .locks()
            .acquire_all([
                (Patient::COLLECTION, admission.patient_id),
                bed_lock(&admission.ward, &admission.bed_number),
            ])
            .await;
        self.fetch::<Patient>(admission.patient_id, "Patient").await?;
        self.fetch::<Doctor>(admission.doctor_id, "Doctor").await?;

        let admissions = self.db.repository::<Admission>();
        let current = admissions
            .count(
                &ListQuery::new()
                    .filter("patientId", admission.patient_id.to_string())
                    .filter("status", "admitted"),
            )
            .await?;
        if current > 0 {
            return Err(RegistryError::InvalidState(
                "patient is already admitted".to_string(),
            ));
        }
        self.check_bed_free(&admission.ward, &admission.bed_number, admission.id)
            .await?;

        let admitted = admissions
            .create(Admission {
                status: AdmissionStatus::Admitted,
                discharged_at: None,
                ..admission
            })
            .await?;
        info!(admission_id = %admitted.admission_id, "Patient admitted");
        Ok(admitted)
    }

    /// Move an admitted patient to another bed
    #[instrument(skip(self, request), fields(ward = %request.ward, bed = %request.bed_number))]
    pub async fn transfer(
        &self,
        admission_id: Uuid,
        request: TransferRequest,
    ) -> RegistryResult<Admission> {
        let ward = request.ward.trim().to_string();
        let bed_number = request.bed_number.trim().to_string();
        if ward.is_empty() || bed_number.is_empty() {
            return Err(RegistryError::Validation(
                "ward and bedNumber are required".to_string(),
            ));
        }
        let _locks = self
            .db
            .locks()
            .acquire_all([
                (Admission::COLLECTION, admission_id),
                bed_lock(&ward, &bed_number),
            ])
            .await;

        let mut admission = self.fetch::<Admission>(admission_id, "Admission").await?;
        if admission.status != AdmissionStatus::Admitted {
            return Err(RegistryError::InvalidState(format!(
                "admission {} is discharged",
                admission.admission_id
            )));
        }
        if admission.ward == ward && admission.bed_number == bed_number {
            return Ok(admission);
        }
        self.check_bed_free(&ward, &bed_number, admission.id).await?;

        let from = format!("{}/{}", admission.ward, admission.bed_number);
        admission.ward = ward;
        admission.bed_number = bed_number;
        let mut batch = WriteBatch::new();
        batch.update(&admission)?;
        self.db.commit(batch).await?;
        info!(
            admission_id = %admission.admission_id,
            from = %from,
            to = %format!("{}/{}", admission.ward, admission.bed_number),
            "Patient transferred"
        );
        Ok(admission)
    }

    /// Callers hold the bed's lock
    async fn check_bed_free(&self, ward: &str, bed_number: &str, admission_id: Uuid) -> RegistryResult<()> {
        let occupants = self
            .db
            .repository::<Admission>()
            .list(
                &ListQuery::new()
                    .filter("ward", ward)
                    .filter("bedNumber", bed_number)
                    .filter("status", "admitted"),
            )
            .await?;
        if occupants.iter().any(|other| other.id != admission_id) {
            return Err(RegistryError::InvalidState(format!(
                "bed {bed_number} in {ward} is occupied"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn discharge(
        &self,
        admission_id: Uuid,
        request: DischargeRequest,
    ) -> RegistryResult<Admission> {
        let _lock = self
            .db
            .locks()
            .acquire(Admission::COLLECTION, admission_id)
            .await;
        let mut admission = self.fetch::<Admission>(admission_id, "Admission").await?;
        if admission.status != AdmissionStatus::Admitted {
            return Err(RegistryError::InvalidState(format!(
                "admission {} is already discharged",
                admission.admission_id
            )));
        }

        let discharged_at = request.discharged_at.unwrap_or_else(Utc::now);
        if discharged_at < admission.admitted_at {
            return Err(RegistryError::Validation(
                "dischargedAt is before admittedAt".to_string(),
            ));
        }
        admission.status = AdmissionStatus::Discharged;
        admission.discharged_at = Some(discharged_at);
        if let Some(diagnosis) = request.diagnosis {
            admission.diagnosis = Some(diagnosis);
        }

        let mut batch = WriteBatch::new();
        batch.update(&admission)?;
        self.db.commit(batch).await?;
        info!(admission_id = %admission.admission_id, "Patient discharged");
        Ok(admission)
    }
}

fn same_slot(before: &Appointment, after: &Appointment) -> bool {
    before.status == AppointmentStatus::Scheduled
        && before.doctor_id == after.doctor_id
        && before.date == after.date
        && before.time == after.time
}
