//! Doctor models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A doctor who can be booked for appointments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub phone: String,
    pub email: Option<String>,
    /// Free text (e.g., "Mon, Wed, Fri")
    pub available_days: String,
    /// Free text (e.g., "9:00 AM - 5:00 PM")
    pub available_time: String,
}

/// Validated doctor fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorData {
    pub name: String,
    pub specialization: String,
    pub phone: String,
    pub email: Option<String>,
    pub available_days: String,
    pub available_time: String,
}

impl Doctor {
    pub fn new(id: i64, data: DoctorData) -> Self {
        Self {
            id,
            name: data.name,
            specialization: data.specialization,
            phone: data.phone,
            email: data.email,
            available_days: data.available_days,
            available_time: data.available_time,
        }
    }
}

impl From<&Doctor> for DoctorData {
    fn from(d: &Doctor) -> Self {
        Self {
            name: d.name.clone(),
            specialization: d.specialization.clone(),
            phone: d.phone.clone(),
            email: d.email.clone(),
            available_days: d.available_days.clone(),
            available_time: d.available_time.clone(),
        }
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dr. {} ({})", self.name, self.specialization)
    }
}
