//! Treatment models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::appointment::AppointmentDetail;

/// The clinical outcome of a single appointment. At most one per appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Treatment {
    pub id: i64,
    pub appointment_id: i64,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: String,
    pub treatment_date: NaiveDate,
}

/// Validated treatment fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentData {
    pub appointment_id: i64,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: String,
    pub treatment_date: NaiveDate,
}

impl Treatment {
    pub fn new(id: i64, data: TreatmentData) -> Self {
        Self {
            id,
            appointment_id: data.appointment_id,
            diagnosis: data.diagnosis,
            prescription: data.prescription,
            notes: data.notes,
            treatment_date: data.treatment_date,
        }
    }
}

impl From<&Treatment> for TreatmentData {
    fn from(t: &Treatment) -> Self {
        Self {
            appointment_id: t.appointment_id,
            diagnosis: t.diagnosis.clone(),
            prescription: t.prescription.clone(),
            notes: t.notes.clone(),
            treatment_date: t.treatment_date,
        }
    }
}

/// A treatment with its appointment (and that appointment's parties) loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentDetail {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub appointment: AppointmentDetail,
}

impl fmt::Display for TreatmentDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Treatment for {} on {}",
            self.appointment.patient.name, self.treatment.treatment_date
        )
    }
}
