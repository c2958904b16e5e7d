//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::choices::{BloodGroup, Gender};

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Store-assigned row ID
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub phone: String,
    pub email: Option<String>,
    /// Free-text postal address, empty when not given
    pub address: String,
    pub date_registered: NaiveDate,
}

/// Validated patient fields, ready to be written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientData {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub date_registered: NaiveDate,
}

impl Patient {
    /// Attach a row ID to validated fields.
    pub fn new(id: i64, data: PatientData) -> Self {
        Self {
            id,
            name: data.name,
            age: data.age,
            gender: data.gender,
            blood_group: data.blood_group,
            phone: data.phone,
            email: data.email,
            address: data.address,
            date_registered: data.date_registered,
        }
    }
}

impl From<&Patient> for PatientData {
    fn from(p: &Patient) -> Self {
        Self {
            name: p.name.clone(),
            age: p.age,
            gender: p.gender,
            blood_group: p.blood_group,
            phone: p.phone.clone(),
            email: p.email.clone(),
            address: p.address.clone(),
            date_registered: p.date_registered,
        }
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient_keeps_fields() {
        let data = PatientData {
            name: "Ada Obi".into(),
            age: 34,
            gender: Gender::Female,
            blood_group: BloodGroup::OPositive,
            phone: "555-0101".into(),
            email: None,
            address: String::new(),
            date_registered: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let patient = Patient::new(7, data.clone());
        assert_eq!(patient.id, 7);
        assert_eq!(PatientData::from(&patient), data);
        assert_eq!(patient.to_string(), "Ada Obi");
    }
}
