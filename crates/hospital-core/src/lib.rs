//! Hospital Core Library
//!
//! Front-office records for a small hospital: patients, doctors,
//! appointments, treatments and bills.
//!
//! # Architecture
//!
//! ```text
//!   form input (string map)
//!          │
//!          ▼
//!   [validation]  per-field errors ──────────────► caller
//!          │
//!          ▼
//!   [db] record store ── reference checks, one treatment per appointment,
//!          │              explicit cascade deletes (one transaction each)
//!          ▼
//!   [db] listings / dashboard ── ordered, filtered, 10 per page
//! ```
//!
//! [`clinic::Clinic`] ties the layers together and returns each stored record
//! with the confirmation message to show.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Doctor, Appointment, Treatment, Bill)
//! - [`validation`]: Static field tables and form cleaning
//! - [`db`]: SQLite record store, listings and dashboard
//! - [`clinic`]: Validated operations and the mark-paid workflow

pub mod clinic;
pub mod db;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use clinic::{Clinic, ClinicError, ClinicResult, Outcome};
pub use db::{CascadeSummary, Dashboard, Database, DbError, Page, PAGE_SIZE};
pub use models::{
    Appointment, AppointmentDetail, AppointmentStatus, Bill, BillDetail, BloodGroup, Doctor,
    Entity, Gender, Money, Patient, PaymentMethod, PaymentState, Treatment, TreatmentDetail,
};
pub use validation::{FieldErrors, FormData};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HospitalError {
    #[error("Validation failed: {errors:?}")]
    Validation {
        errors: HashMap<String, Vec<String>>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ClinicError> for HospitalError {
    fn from(e: ClinicError) -> Self {
        if let Some(errors) = e.field_errors() {
            return HospitalError::Validation {
                errors: errors.into_inner().into_iter().collect(),
            };
        }
        match e {
            ClinicError::NotFound { .. } => HospitalError::NotFound(e.to_string()),
            ClinicError::InvalidPage(_) => HospitalError::InvalidInput(e.to_string()),
            other => HospitalError::Database(other.to_string()),
        }
    }
}

impl From<DbError> for HospitalError {
    fn from(e: DbError) -> Self {
        ClinicError::from(e).into()
    }
}

impl<T> From<std::sync::PoisonError<T>> for HospitalError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        HospitalError::Database(format!("Lock poisoned: {}", e))
    }
}

fn form(fields: HashMap<String, String>) -> FormData {
    fields.into_iter().collect()
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<HospitalCore>, HospitalError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(HospitalCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<HospitalCore>, HospitalError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(HospitalCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// Record inputs are string maps with the same field names and formats as
/// the web forms; list filters use the query-string names.
#[derive(uniffi::Object)]
pub struct HospitalCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl HospitalCore {
    /// Entity counts and recent activity.
    pub fn dashboard(&self) -> Result<FfiDashboard, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).dashboard()?.into())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    pub fn create_patient(
        &self,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).create_patient(&form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn get_patient(&self, id: i64) -> Result<FfiPatient, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).get_patient(id)?.into())
    }

    pub fn list_patients(
        &self,
        filters: HashMap<String, String>,
        page: u32,
    ) -> Result<FfiPatientPage, HospitalError> {
        let db = self.db.lock()?;
        let filter = validation::patient_filter(&form(filters)).map_err(ClinicError::from)?;
        let page = Clinic::new(&db).list_patients(&filter, page)?;
        Ok(FfiPatientPage {
            info: FfiPageInfo::of(&page),
            items: page.items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn update_patient(
        &self,
        id: i64,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).update_patient(id, &form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn delete_patient(&self, id: i64) -> Result<FfiDeleted, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).delete_patient(id)?.into())
    }

    // =========================================================================
    // Doctor Operations
    // =========================================================================

    pub fn create_doctor(&self, fields: HashMap<String, String>) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).create_doctor(&form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn get_doctor(&self, id: i64) -> Result<FfiDoctor, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).get_doctor(id)?.into())
    }

    pub fn list_doctors(
        &self,
        filters: HashMap<String, String>,
        page: u32,
    ) -> Result<FfiDoctorPage, HospitalError> {
        let db = self.db.lock()?;
        let filter = validation::doctor_filter(&form(filters)).map_err(ClinicError::from)?;
        let page = Clinic::new(&db).list_doctors(&filter, page)?;
        Ok(FfiDoctorPage {
            info: FfiPageInfo::of(&page),
            items: page.items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn update_doctor(
        &self,
        id: i64,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).update_doctor(id, &form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn delete_doctor(&self, id: i64) -> Result<FfiDeleted, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).delete_doctor(id)?.into())
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    pub fn create_appointment(
        &self,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).create_appointment(&form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn get_appointment(&self, id: i64) -> Result<FfiAppointment, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).get_appointment(id)?.into())
    }

    pub fn list_appointments(
        &self,
        filters: HashMap<String, String>,
        page: u32,
    ) -> Result<FfiAppointmentPage, HospitalError> {
        let db = self.db.lock()?;
        let filter =
            validation::appointment_filter(&form(filters)).map_err(ClinicError::from)?;
        let page = Clinic::new(&db).list_appointments(&filter, page)?;
        Ok(FfiAppointmentPage {
            info: FfiPageInfo::of(&page),
            items: page.items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn update_appointment(
        &self,
        id: i64,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).update_appointment(id, &form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn delete_appointment(&self, id: i64) -> Result<FfiDeleted, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).delete_appointment(id)?.into())
    }

    // =========================================================================
    // Treatment Operations
    // =========================================================================

    pub fn create_treatment(
        &self,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).create_treatment(&form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn get_treatment(&self, id: i64) -> Result<FfiTreatment, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).get_treatment(id)?.into())
    }

    pub fn list_treatments(
        &self,
        filters: HashMap<String, String>,
        page: u32,
    ) -> Result<FfiTreatmentPage, HospitalError> {
        let db = self.db.lock()?;
        let filter = validation::treatment_filter(&form(filters)).map_err(ClinicError::from)?;
        let page = Clinic::new(&db).list_treatments(&filter, page)?;
        Ok(FfiTreatmentPage {
            info: FfiPageInfo::of(&page),
            items: page.items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn update_treatment(
        &self,
        id: i64,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).update_treatment(id, &form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn delete_treatment(&self, id: i64) -> Result<FfiDeleted, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).delete_treatment(id)?.into())
    }

    // =========================================================================
    // Bill Operations
    // =========================================================================

    pub fn create_bill(&self, fields: HashMap<String, String>) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).create_bill(&form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn get_bill(&self, id: i64) -> Result<FfiBill, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).get_bill(id)?.into())
    }

    pub fn list_bills(
        &self,
        filters: HashMap<String, String>,
        page: u32,
    ) -> Result<FfiBillPage, HospitalError> {
        let db = self.db.lock()?;
        let filter = validation::bill_filter(&form(filters)).map_err(ClinicError::from)?;
        let page = Clinic::new(&db).list_bills(&filter, page)?;
        Ok(FfiBillPage {
            info: FfiPageInfo::of(&page),
            items: page.items.into_iter().map(Into::into).collect(),
        })
    }

    pub fn update_bill(
        &self,
        id: i64,
        fields: HashMap<String, String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).update_bill(id, &form(fields))?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }

    pub fn delete_bill(&self, id: i64) -> Result<FfiDeleted, HospitalError> {
        let db = self.db.lock()?;
        Ok(Clinic::new(&db).delete_bill(id)?.into())
    }

    /// Settle a bill, recording `payment_method` (default cash) if it has none.
    pub fn mark_bill_paid(
        &self,
        id: i64,
        payment_method: Option<String>,
    ) -> Result<FfiSaved, HospitalError> {
        let db = self.db.lock()?;
        let outcome = Clinic::new(&db).mark_bill_paid(id, payment_method.as_deref())?;
        Ok(FfiSaved::new(outcome.record.id, outcome.message))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// Result of a create, update or mark-paid call.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSaved {
    pub id: i64,
    pub message: String,
}

impl FfiSaved {
    fn new(id: i64, message: String) -> Self {
        Self { id, message }
    }
}

/// Result of a delete, with the number of rows removed per entity.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDeleted {
    pub message: String,
    pub patients: u32,
    pub doctors: u32,
    pub appointments: u32,
    pub treatments: u32,
    pub bills: u32,
}

impl From<Outcome<CascadeSummary>> for FfiDeleted {
    fn from(outcome: Outcome<CascadeSummary>) -> Self {
        let summary = outcome.record;
        Self {
            message: outcome.message,
            patients: summary.patients as u32,
            doctors: summary.doctors as u32,
            appointments: summary.appointments as u32,
            treatments: summary.treatments as u32,
            bills: summary.bills as u32,
        }
    }
}

/// FFI-safe patient. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub blood_group: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub date_registered: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender.label().to_string(),
            blood_group: patient.blood_group.as_str().to_string(),
            phone: patient.phone,
            email: patient.email,
            address: patient.address,
            date_registered: patient.date_registered.to_string(),
        }
    }
}

/// FFI-safe doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub phone: String,
    pub email: Option<String>,
    pub available_days: String,
    pub available_time: String,
    pub label: String,
}

impl From<Doctor> for FfiDoctor {
    fn from(doctor: Doctor) -> Self {
        Self {
            label: doctor.to_string(),
            id: doctor.id,
            name: doctor.name,
            specialization: doctor.specialization,
            phone: doctor.phone,
            email: doctor.email,
            available_days: doctor.available_days,
            available_time: doctor.available_time,
        }
    }
}

/// FFI-safe appointment with its parties' names.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    pub status: String,
    pub notes: String,
    pub label: String,
}

impl From<AppointmentDetail> for FfiAppointment {
    fn from(detail: AppointmentDetail) -> Self {
        let label = detail.to_string();
        let appointment = detail.appointment;
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient_name: detail.patient.name,
            doctor_id: appointment.doctor_id,
            doctor_name: detail.doctor.name,
            date: appointment.date.to_string(),
            time: appointment.time.format("%H:%M:%S").to_string(),
            status: appointment.status.to_string(),
            notes: appointment.notes,
            label,
        }
    }
}

/// FFI-safe treatment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTreatment {
    pub id: i64,
    pub appointment_id: i64,
    pub patient_name: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: String,
    pub treatment_date: String,
    pub label: String,
}

impl From<TreatmentDetail> for FfiTreatment {
    fn from(detail: TreatmentDetail) -> Self {
        let label = detail.to_string();
        let treatment = detail.treatment;
        Self {
            id: treatment.id,
            appointment_id: treatment.appointment_id,
            patient_name: detail.appointment.patient.name,
            doctor_name: detail.appointment.doctor.name,
            diagnosis: treatment.diagnosis,
            prescription: treatment.prescription,
            notes: treatment.notes,
            treatment_date: treatment.treatment_date.to_string(),
            label,
        }
    }
}

/// FFI-safe bill. Amounts are decimal strings (`"150.00"`).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBill {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub appointment_id: i64,
    pub amount: String,
    pub paid: bool,
    pub date_issued: String,
    pub payment_method: Option<String>,
    pub label: String,
}

impl From<BillDetail> for FfiBill {
    fn from(detail: BillDetail) -> Self {
        let label = detail.to_string();
        let bill = detail.bill;
        Self {
            id: bill.id,
            patient_id: bill.patient_id,
            patient_name: detail.patient.name,
            appointment_id: bill.appointment_id,
            amount: bill.amount.to_string(),
            paid: bill.paid,
            date_issued: bill.date_issued.to_string(),
            payment_method: bill.payment_method.map(|m| m.to_string()),
            label,
        }
    }
}

/// Position of a page within its listing.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPageInfo {
    pub page: u32,
    pub num_pages: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl FfiPageInfo {
    fn of<T>(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            num_pages: page.num_pages,
            total_count: page.total_count,
            has_next: page.has_next,
            has_previous: page.has_previous,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientPage {
    pub info: FfiPageInfo,
    pub items: Vec<FfiPatient>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctorPage {
    pub info: FfiPageInfo,
    pub items: Vec<FfiDoctor>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentPage {
    pub info: FfiPageInfo,
    pub items: Vec<FfiAppointment>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTreatmentPage {
    pub info: FfiPageInfo,
    pub items: Vec<FfiTreatment>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBillPage {
    pub info: FfiPageInfo,
    pub items: Vec<FfiBill>,
}

/// FFI-safe dashboard.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub total_patients: u64,
    pub total_doctors: u64,
    pub total_appointments: u64,
    pub total_treatments: u64,
    pub total_bills: u64,
    pub unpaid_bills: u64,
    pub recent_appointments: Vec<FfiAppointment>,
    pub recent_patients: Vec<FfiPatient>,
}

impl From<Dashboard> for FfiDashboard {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            total_patients: dashboard.total_patients,
            total_doctors: dashboard.total_doctors,
            total_appointments: dashboard.total_appointments,
            total_treatments: dashboard.total_treatments,
            total_bills: dashboard.total_bills,
            unpaid_bills: dashboard.unpaid_bills,
            recent_appointments: dashboard
                .recent_appointments
                .into_iter()
                .map(Into::into)
                .collect(),
            recent_patients: dashboard.recent_patients.into_iter().map(Into::into).collect(),
        }
    }
}
