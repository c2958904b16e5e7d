//! Validation layer.
//!
//! Every create and update passes through here first. Input is a flat string
//! map (form semantics); output is either the entity's validated data or the
//! complete set of per-field errors. Nothing is written until validation
//! succeeds.

mod clean;
mod filters;
mod schema;

pub use clean::*;
pub use filters::*;
pub use schema::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{
    AppointmentData, AppointmentStatus, BillData, BloodGroup, DoctorData, Gender, PatientData,
    PaymentMethod, TreatmentData,
};

/// Raw form input: field name to submitted string.
pub type FormData = BTreeMap<String, String>;

/// User-facing error messages.
pub mod messages {
    pub const REQUIRED: &str = "This field is required.";
    pub const INVALID_INTEGER: &str = "Enter a whole number.";
    pub const INVALID_EMAIL: &str = "Enter a valid email address.";
    pub const INVALID_DATE: &str = "Enter a valid date.";
    pub const INVALID_TIME: &str = "Enter a valid time.";
    pub const INVALID_BOOLEAN: &str = "Enter a valid boolean.";
    pub const INVALID_REFERENCE: &str =
        "Select a valid choice. That choice is not one of the available choices.";
    pub const DUPLICATE_TREATMENT: &str = "Treatment with this Appointment already exists.";
    pub const APPOINTMENT_PATIENT_MISMATCH: &str =
        "Appointment does not belong to the selected patient.";
    pub const APPOINTMENT_BILLED_TO_PATIENT: &str =
        "Appointment has bills issued to its current patient.";

    pub fn invalid_choice(value: &str) -> String {
        format!(
            "Select a valid choice. {} is not one of the available choices.",
            value
        )
    }
}

/// Per-field error messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate patient input. `default_date` fills a blank `date_registered`.
pub fn validate_patient(form: &FormData, default_date: NaiveDate) -> Result<PatientData, FieldErrors> {
    let cleaned = clean(form, PATIENT_FIELDS)?;
    let age = u32::try_from(cleaned.integer("age")?)
        .map_err(|_| FieldErrors::single("age", messages::INVALID_INTEGER))?;

    Ok(PatientData {
        name: cleaned.text("name")?,
        age,
        gender: cleaned.choice("gender", Gender::parse)?,
        blood_group: cleaned.choice("blood_group", BloodGroup::parse)?,
        phone: cleaned.text("phone")?,
        email: cleaned.optional_text("email"),
        address: cleaned.text_or_empty("address"),
        date_registered: cleaned.optional_date("date_registered").unwrap_or(default_date),
    })
}

pub fn validate_doctor(form: &FormData) -> Result<DoctorData, FieldErrors> {
    let cleaned = clean(form, DOCTOR_FIELDS)?;

    Ok(DoctorData {
        name: cleaned.text("name")?,
        specialization: cleaned.text("specialization")?,
        phone: cleaned.text("phone")?,
        email: cleaned.optional_text("email"),
        available_days: cleaned.text("available_days")?,
        available_time: cleaned.text("available_time")?,
    })
}

/// Validate appointment input. Reference existence is checked by the store.
pub fn validate_appointment(form: &FormData) -> Result<AppointmentData, FieldErrors> {
    let cleaned = clean(form, APPOINTMENT_FIELDS)?;

    Ok(AppointmentData {
        patient_id: cleaned.reference("patient")?,
        doctor_id: cleaned.reference("doctor")?,
        date: cleaned.date("date")?,
        time: cleaned.time("time")?,
        status: cleaned
            .optional_choice("status", AppointmentStatus::parse)
            .unwrap_or_default(),
        notes: cleaned.text_or_empty("notes"),
    })
}

pub fn validate_treatment(
    form: &FormData,
    default_date: NaiveDate,
) -> Result<TreatmentData, FieldErrors> {
    let cleaned = clean(form, TREATMENT_FIELDS)?;

    Ok(TreatmentData {
        appointment_id: cleaned.reference("appointment")?,
        diagnosis: cleaned.text("diagnosis")?,
        prescription: cleaned.text("prescription")?,
        notes: cleaned.text_or_empty("notes"),
        treatment_date: cleaned.optional_date("treatment_date").unwrap_or(default_date),
    })
}

pub fn validate_bill(form: &FormData, default_date: NaiveDate) -> Result<BillData, FieldErrors> {
    let cleaned = clean(form, BILL_FIELDS)?;

    Ok(BillData {
        patient_id: cleaned.reference("patient")?,
        appointment_id: cleaned.reference("appointment")?,
        amount: cleaned.decimal("amount")?,
        paid: cleaned.flag("paid"),
        date_issued: cleaned.optional_date("date_issued").unwrap_or(default_date),
        payment_method: cleaned.optional_choice("payment_method", PaymentMethod::parse),
    })
}

/// Validate the optional method given when settling a bill. Blank means none.
pub fn validate_payment_method(raw: Option<&str>) -> Result<Option<PaymentMethod>, FieldErrors> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => PaymentMethod::parse(value)
            .map(Some)
            .ok_or_else(|| FieldErrors::single("payment_method", messages::invalid_choice(value))),
    }
}

/// Turn any string-keyed map into form input.
pub fn form_from<I, K, V>(pairs: I) -> FormData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn patient_form() -> FormData {
        form_from([
            ("name", "John Doe"),
            ("age", "42"),
            ("gender", "M"),
            ("blood_group", "O+"),
            ("phone", "555-0100"),
            ("email", "john@example.com"),
        ])
    }

    #[test]
    fn test_valid_patient() {
        let data = validate_patient(&patient_form(), today()).unwrap();
        assert_eq!(data.name, "John Doe");
        assert_eq!(data.age, 42);
        assert_eq!(data.gender, Gender::Male);
        assert_eq!(data.blood_group, BloodGroup::OPositive);
        assert_eq!(data.address, "");
        assert_eq!(data.date_registered, today());
    }

    #[test]
    fn test_negative_age_and_bad_gender() {
        let mut form = patient_form();
        form.insert("age".into(), "-1".into());
        form.insert("gender".into(), "X".into());

        let errors = validate_patient(&form, today()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("age").unwrap()[0],
            "Ensure this value is greater than or equal to 0."
        );
        assert_eq!(
            errors.get("gender").unwrap()[0],
            messages::invalid_choice("X")
        );
    }

    #[test]
    fn test_missing_required_fields_all_reported() {
        let errors = validate_patient(&FormData::new(), today()).unwrap_err();
        for field in ["name", "age", "gender", "blood_group", "phone"] {
            assert_eq!(errors.get(field).unwrap()[0], messages::REQUIRED, "{}", field);
        }
        assert!(!errors.contains("email"));
        assert!(!errors.contains("date_registered"));
    }

    #[test]
    fn test_appointment_defaults_to_scheduled() {
        let form = form_from([
            ("patient", "1"),
            ("doctor", "2"),
            ("date", "2024-07-01"),
            ("time", "09:30"),
        ]);
        let data = validate_appointment(&form).unwrap();
        assert_eq!(data.status, AppointmentStatus::Scheduled);
        assert_eq!(data.patient_id, 1);
        assert_eq!(data.doctor_id, 2);
    }

    #[test]
    fn test_appointment_rejects_bad_reference() {
        let form = form_from([
            ("patient", "abc"),
            ("doctor", "0"),
            ("date", "2024-07-01"),
            ("time", "25:00"),
        ]);
        let errors = validate_appointment(&form).unwrap_err();
        assert!(errors.contains("patient"));
        assert!(errors.contains("doctor"));
        assert_eq!(errors.get("time").unwrap()[0], messages::INVALID_TIME);
    }

    #[test]
    fn test_bill_amount_rules() {
        let mut form = form_from([("patient", "1"), ("appointment", "1"), ("amount", "10.999")]);
        let errors = validate_bill(&form, today()).unwrap_err();
        assert_eq!(
            errors.get("amount").unwrap()[0],
            "Ensure that there are no more than 2 decimal places."
        );

        form.insert("amount".into(), "150".into());
        let data = validate_bill(&form, today()).unwrap();
        assert_eq!(data.amount.to_string(), "150.00");
        assert!(!data.paid);
        assert_eq!(data.payment_method, None);
        assert_eq!(data.date_issued, today());
    }

    #[test]
    fn test_payment_method_input() {
        assert_eq!(validate_payment_method(None).unwrap(), None);
        assert_eq!(validate_payment_method(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_payment_method(Some("online")).unwrap(),
            Some(PaymentMethod::Online)
        );
        assert!(validate_payment_method(Some("Cheque")).is_err());
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.add("age", "bad");
        errors.add("name", "missing");
        assert_eq!(errors.to_string(), "age: bad; name: missing");
    }
}
