//! List filters from query-string input.
//!
//! Filters go through the same cleaning as record fields, so a bad filter
//! value is reported per field instead of silently matching nothing.

use super::schema::{ChoiceSet, FieldKind, FieldSpec};
use super::{clean, FieldErrors, FormData};
use crate::db::{AppointmentFilter, BillFilter, DoctorFilter, PatientFilter, TreatmentFilter};
use crate::models::{AppointmentStatus, BloodGroup, Gender, PaymentMethod};

const SEARCH: FieldSpec = FieldSpec::optional("search", "", FieldKind::Text).max_length(200);

const PATIENT_FILTER_FIELDS: &[FieldSpec] = &[
    SEARCH,
    FieldSpec::optional("gender", "gender", FieldKind::Choice(ChoiceSet::Gender)),
    FieldSpec::optional(
        "blood_group",
        "blood_group",
        FieldKind::Choice(ChoiceSet::BloodGroup),
    ),
];

const DOCTOR_FILTER_FIELDS: &[FieldSpec] = &[
    SEARCH,
    FieldSpec::optional("specialization", "specialization", FieldKind::Text).max_length(200),
];

const APPOINTMENT_FILTER_FIELDS: &[FieldSpec] = &[
    SEARCH,
    FieldSpec::optional(
        "status",
        "status",
        FieldKind::Choice(ChoiceSet::AppointmentStatus),
    ),
    FieldSpec::optional("date", "date", FieldKind::Date),
];

const TREATMENT_FILTER_FIELDS: &[FieldSpec] = &[SEARCH];

const BILL_FILTER_FIELDS: &[FieldSpec] = &[
    SEARCH,
    FieldSpec::optional("paid", "paid", FieldKind::Boolean),
    FieldSpec::optional(
        "payment_method",
        "payment_method",
        FieldKind::Choice(ChoiceSet::PaymentMethod),
    ),
];

pub fn patient_filter(form: &FormData) -> Result<PatientFilter, FieldErrors> {
    let cleaned = clean(form, PATIENT_FILTER_FIELDS)?;
    Ok(PatientFilter {
        search: cleaned.optional_text("search"),
        gender: cleaned.optional_choice("gender", Gender::parse),
        blood_group: cleaned.optional_choice("blood_group", BloodGroup::parse),
    })
}

pub fn doctor_filter(form: &FormData) -> Result<DoctorFilter, FieldErrors> {
    let cleaned = clean(form, DOCTOR_FILTER_FIELDS)?;
    Ok(DoctorFilter {
        search: cleaned.optional_text("search"),
        specialization: cleaned.optional_text("specialization"),
    })
}

pub fn appointment_filter(form: &FormData) -> Result<AppointmentFilter, FieldErrors> {
    let cleaned = clean(form, APPOINTMENT_FILTER_FIELDS)?;
    Ok(AppointmentFilter {
        search: cleaned.optional_text("search"),
        status: cleaned.optional_choice("status", AppointmentStatus::parse),
        date: cleaned.optional_date("date"),
    })
}

pub fn treatment_filter(form: &FormData) -> Result<TreatmentFilter, FieldErrors> {
    let cleaned = clean(form, TREATMENT_FILTER_FIELDS)?;
    Ok(TreatmentFilter {
        search: cleaned.optional_text("search"),
    })
}

pub fn bill_filter(form: &FormData) -> Result<BillFilter, FieldErrors> {
    let cleaned = clean(form, BILL_FILTER_FIELDS)?;
    Ok(BillFilter {
        search: cleaned.optional_text("search"),
        paid: cleaned.optional_flag("paid"),
        payment_method: cleaned.optional_choice("payment_method", PaymentMethod::parse),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{form_from, messages};
    use chrono::NaiveDate;

    #[test]
    fn test_empty_input_means_no_filter() {
        assert_eq!(patient_filter(&FormData::new()).unwrap(), PatientFilter::default());
        assert_eq!(bill_filter(&FormData::new()).unwrap(), BillFilter::default());
    }

    #[test]
    fn test_typed_filters() {
        let filter = appointment_filter(&form_from([
            ("status", "cancelled"),
            ("date", "2024-03-04"),
            ("search", " smith "),
            ("page", "2"),
        ]))
        .unwrap();
        assert_eq!(filter.status, Some(AppointmentStatus::Cancelled));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(filter.search.as_deref(), Some("smith"));

        let filter = bill_filter(&form_from([("paid", "no"), ("payment_method", "card")])).unwrap();
        assert_eq!(filter.paid, Some(false));
        assert_eq!(filter.payment_method, Some(PaymentMethod::Card));
    }

    #[test]
    fn test_bad_filter_values_reported() {
        let errors = patient_filter(&form_from([("gender", "Q"), ("blood_group", "C+")]))
            .unwrap_err();
        assert_eq!(errors.get("gender").unwrap()[0], messages::invalid_choice("Q"));
        assert!(errors.contains("blood_group"));
    }
}
