//! Create/read/update/delete for patients, doctors, appointments and
//! treatments.

use super::{found, Clinic, ClinicResult, Outcome};
use crate::db::{
    AppointmentFilter, CascadeSummary, DoctorFilter, Page, PatientFilter, TreatmentFilter,
};
use crate::models::{
    Appointment, AppointmentDetail, Doctor, Entity, Patient, Treatment, TreatmentDetail,
};
use crate::validation::{
    validate_appointment, validate_doctor, validate_patient, validate_treatment, FormData,
};

impl Clinic<'_> {
    // =========================================================================
    // Patients
    // =========================================================================

    pub fn create_patient(&self, form: &FormData) -> ClinicResult<Outcome<Patient>> {
        let data = validate_patient(form, self.today())?;
        let patient = self.db.insert_patient(&data)?;
        Ok(Outcome::new(patient, "Patient registered successfully."))
    }

    pub fn get_patient(&self, id: i64) -> ClinicResult<Patient> {
        found(Entity::Patient, id, self.db.get_patient(id)?)
    }

    pub fn list_patients(&self, filter: &PatientFilter, page: u32) -> ClinicResult<Page<Patient>> {
        Ok(self.db.list_patients(filter, page)?)
    }

    /// A blank registration date keeps the stored one.
    pub fn update_patient(&self, id: i64, form: &FormData) -> ClinicResult<Outcome<Patient>> {
        let existing = self.get_patient(id)?;
        let data = validate_patient(form, existing.date_registered)?;
        let patient = self.db.update_patient(id, &data)?;
        Ok(Outcome::new(patient, "Patient updated successfully."))
    }

    /// Removes the patient's appointments, treatments and bills as well.
    pub fn delete_patient(&self, id: i64) -> ClinicResult<Outcome<CascadeSummary>> {
        let summary = self.db.delete_patient(id)?;
        Ok(Outcome::new(summary, "Patient deleted successfully."))
    }

    // =========================================================================
    // Doctors
    // =========================================================================

    pub fn create_doctor(&self, form: &FormData) -> ClinicResult<Outcome<Doctor>> {
        let data = validate_doctor(form)?;
        let doctor = self.db.insert_doctor(&data)?;
        Ok(Outcome::new(doctor, "Doctor added successfully."))
    }

    pub fn get_doctor(&self, id: i64) -> ClinicResult<Doctor> {
        found(Entity::Doctor, id, self.db.get_doctor(id)?)
    }

    pub fn list_doctors(&self, filter: &DoctorFilter, page: u32) -> ClinicResult<Page<Doctor>> {
        Ok(self.db.list_doctors(filter, page)?)
    }

    pub fn update_doctor(&self, id: i64, form: &FormData) -> ClinicResult<Outcome<Doctor>> {
        self.get_doctor(id)?;
        let data = validate_doctor(form)?;
        let doctor = self.db.update_doctor(id, &data)?;
        Ok(Outcome::new(doctor, "Doctor updated successfully."))
    }

    pub fn delete_doctor(&self, id: i64) -> ClinicResult<Outcome<CascadeSummary>> {
        let summary = self.db.delete_doctor(id)?;
        Ok(Outcome::new(summary, "Doctor deleted successfully."))
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    pub fn create_appointment(&self, form: &FormData) -> ClinicResult<Outcome<Appointment>> {
        let data = validate_appointment(form)?;
        let appointment = self.db.insert_appointment(&data)?;
        Ok(Outcome::new(appointment, "Appointment scheduled successfully."))
    }

    pub fn get_appointment(&self, id: i64) -> ClinicResult<AppointmentDetail> {
        found(Entity::Appointment, id, self.db.get_appointment(id)?)
    }

    pub fn list_appointments(
        &self,
        filter: &AppointmentFilter,
        page: u32,
    ) -> ClinicResult<Page<AppointmentDetail>> {
        Ok(self.db.list_appointments(filter, page)?)
    }

    pub fn update_appointment(
        &self,
        id: i64,
        form: &FormData,
    ) -> ClinicResult<Outcome<Appointment>> {
        self.get_appointment(id)?;
        let data = validate_appointment(form)?;
        let appointment = self.db.update_appointment(id, &data)?;
        Ok(Outcome::new(appointment, "Appointment updated successfully."))
    }

    /// Removes the appointment's treatment and bills as well.
    pub fn delete_appointment(&self, id: i64) -> ClinicResult<Outcome<CascadeSummary>> {
        let summary = self.db.delete_appointment(id)?;
        Ok(Outcome::new(summary, "Appointment deleted successfully."))
    }

    // =========================================================================
    // Treatments
    // =========================================================================

    pub fn create_treatment(&self, form: &FormData) -> ClinicResult<Outcome<Treatment>> {
        let data = validate_treatment(form, self.today())?;
        let treatment = self.db.insert_treatment(&data)?;
        Ok(Outcome::new(treatment, "Treatment recorded successfully."))
    }

    pub fn get_treatment(&self, id: i64) -> ClinicResult<TreatmentDetail> {
        found(Entity::Treatment, id, self.db.get_treatment(id)?)
    }

    pub fn list_treatments(
        &self,
        filter: &TreatmentFilter,
        page: u32,
    ) -> ClinicResult<Page<TreatmentDetail>> {
        Ok(self.db.list_treatments(filter, page)?)
    }

    pub fn update_treatment(&self, id: i64, form: &FormData) -> ClinicResult<Outcome<Treatment>> {
        let existing = self.get_treatment(id)?;
        let data = validate_treatment(form, existing.treatment.treatment_date)?;
        let treatment = self.db.update_treatment(id, &data)?;
        Ok(Outcome::new(treatment, "Treatment updated successfully."))
    }

    pub fn delete_treatment(&self, id: i64) -> ClinicResult<Outcome<CascadeSummary>> {
        let summary = self.db.delete_treatment(id)?;
        Ok(Outcome::new(summary, "Treatment deleted successfully."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::ClinicError;
    use crate::db::Database;
    use crate::models::{AppointmentStatus, Gender};
    use crate::validation::{form_from, messages};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn patient_form(name: &str) -> FormData {
        form_from([
            ("name", name),
            ("age", "35"),
            ("gender", "F"),
            ("blood_group", "A-"),
            ("phone", "555-0140"),
        ])
    }

    fn doctor_form(name: &str) -> FormData {
        form_from([
            ("name", name),
            ("specialization", "Dermatology"),
            ("phone", "555-0141"),
            ("available_days", "Mon-Fri"),
            ("available_time", "10:00 AM - 4:00 PM"),
        ])
    }

    #[test]
    fn test_create_patient_defaults_registration_date() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::with_today(&db, today());

        let outcome = clinic.create_patient(&patient_form("Iris West")).unwrap();
        assert_eq!(outcome.message, "Patient registered successfully.");
        assert_eq!(outcome.record.date_registered, today());
        assert_eq!(outcome.record.gender, Gender::Female);
        assert_eq!(clinic.get_patient(outcome.record.id).unwrap(), outcome.record);
    }

    #[test]
    fn test_invalid_patient_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::with_today(&db, today());

        let mut form = patient_form("Iris West");
        form.insert("age".into(), "-1".into());
        form.insert("gender".into(), "X".into());

        let err = clinic.create_patient(&form).unwrap_err();
        let errors = err.field_errors().unwrap();
        assert!(errors.contains("age"));
        assert!(errors.contains("gender"));
        assert_eq!(db.count(Entity::Patient).unwrap(), 0);
    }

    #[test]
    fn test_update_keeps_registration_date_when_blank() {
        let db = Database::open_in_memory().unwrap();
        let mut form = patient_form("Iris West");
        form.insert("date_registered".into(), "2023-09-01".into());
        let created = Clinic::with_today(&db, today())
            .create_patient(&form)
            .unwrap()
            .record;

        let later = Clinic::with_today(&db, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let mut form = patient_form("Iris West-Allen");
        form.insert("date_registered".into(), "  ".into());
        let outcome = later.update_patient(created.id, &form).unwrap();

        assert_eq!(outcome.message, "Patient updated successfully.");
        assert_eq!(outcome.record.name, "Iris West-Allen");
        assert_eq!(
            outcome.record.date_registered,
            NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()
        );
    }

    #[test]
    fn test_update_missing_is_not_found_before_validation() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::new(&db);
        assert!(matches!(
            clinic.update_doctor(8, &FormData::new()),
            Err(ClinicError::NotFound {
                entity: Entity::Doctor,
                id: 8
            })
        ));
    }

    #[test]
    fn test_appointment_with_unknown_doctor() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::with_today(&db, today());
        let patient = clinic.create_patient(&patient_form("Iris")).unwrap().record;

        let form = form_from([
            ("patient", patient.id.to_string()),
            ("doctor", "31".to_string()),
            ("date", "2024-06-20".to_string()),
            ("time", "14:15".to_string()),
        ]);
        let err = clinic.create_appointment(&form).unwrap_err();
        assert!(matches!(err, ClinicError::Integrity { field: "doctor", .. }));
        assert_eq!(
            err.field_errors().unwrap().get("doctor").unwrap()[0],
            messages::INVALID_REFERENCE
        );
        assert_eq!(db.count(Entity::Appointment).unwrap(), 0);
    }

    #[test]
    fn test_appointment_and_treatment_flow() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::with_today(&db, today());
        let patient = clinic.create_patient(&patient_form("Iris")).unwrap().record;
        let doctor = clinic.create_doctor(&doctor_form("Vega")).unwrap();
        assert_eq!(doctor.message, "Doctor added successfully.");

        let form = form_from([
            ("patient", patient.id.to_string()),
            ("doctor", doctor.record.id.to_string()),
            ("date", "2024-06-20".to_string()),
            ("time", "14:15".to_string()),
            ("status", "completed".to_string()),
        ]);
        let appointment = clinic.create_appointment(&form).unwrap();
        assert_eq!(appointment.message, "Appointment scheduled successfully.");
        assert_eq!(appointment.record.status, AppointmentStatus::Completed);

        let detail = clinic.get_appointment(appointment.record.id).unwrap();
        assert_eq!(detail.to_string(), "Iris with Vega on 2024-06-20");

        let form = form_from([
            ("appointment", appointment.record.id.to_string()),
            ("diagnosis", "Eczema".to_string()),
            ("prescription", "Hydrocortisone".to_string()),
        ]);
        let treatment = clinic.create_treatment(&form).unwrap();
        assert_eq!(treatment.message, "Treatment recorded successfully.");
        assert_eq!(treatment.record.treatment_date, today());

        let err = clinic.create_treatment(&form).unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get("appointment").unwrap()[0],
            messages::DUPLICATE_TREATMENT
        );

        let deleted = clinic.delete_appointment(appointment.record.id).unwrap();
        assert_eq!(deleted.message, "Appointment deleted successfully.");
        assert_eq!(deleted.record.treatments, 1);
        assert!(matches!(
            clinic.get_treatment(treatment.record.id),
            Err(ClinicError::NotFound { .. })
        ));
    }

    #[test]
    fn test_page_out_of_range() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::new(&db);

        assert!(clinic.list_doctors(&DoctorFilter::default(), 1).unwrap().is_empty());
        assert!(matches!(
            clinic.list_doctors(&DoctorFilter::default(), 2),
            Err(ClinicError::InvalidPage(2))
        ));
    }
}
