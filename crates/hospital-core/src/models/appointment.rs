//! Appointment models.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::choices::AppointmentStatus;
use super::doctor::Doctor;
use super::patient::Patient;

/// A booked visit between one patient and one doctor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: String,
}

/// Validated appointment fields. References are unchecked until written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentData {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: String,
}

impl Appointment {
    pub fn new(id: i64, data: AppointmentData) -> Self {
        Self {
            id,
            patient_id: data.patient_id,
            doctor_id: data.doctor_id,
            date: data.date,
            time: data.time,
            status: data.status,
            notes: data.notes,
        }
    }
}

impl From<&Appointment> for AppointmentData {
    fn from(a: &Appointment) -> Self {
        Self {
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            date: a.date,
            time: a.time,
            status: a.status,
            notes: a.notes.clone(),
        }
    }
}

/// An appointment with its patient and doctor loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: Patient,
    pub doctor: Doctor,
}

impl fmt::Display for AppointmentDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with {} on {}",
            self.patient.name, self.doctor.name, self.appointment.date
        )
    }
}
