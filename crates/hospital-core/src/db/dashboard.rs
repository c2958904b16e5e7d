//! Summary counts and recent activity for the landing page.

use serde::{Deserialize, Serialize};

use super::{Database, DbResult};
use crate::models::{AppointmentDetail, Entity, Patient};

/// How many recent appointments and patients the dashboard shows.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_patients: u64,
    pub total_doctors: u64,
    pub total_appointments: u64,
    pub total_treatments: u64,
    pub total_bills: u64,
    pub unpaid_bills: u64,
    pub recent_appointments: Vec<AppointmentDetail>,
    pub recent_patients: Vec<Patient>,
}

impl Database {
    /// Number of rows stored for an entity.
    pub fn count(&self, entity: Entity) -> DbResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", entity.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Gather every dashboard figure from a single read snapshot.
    pub fn dashboard(&self) -> DbResult<Dashboard> {
        let tx = self.conn.unchecked_transaction()?;

        let dashboard = Dashboard {
            total_patients: self.count(Entity::Patient)?,
            total_doctors: self.count(Entity::Doctor)?,
            total_appointments: self.count(Entity::Appointment)?,
            total_treatments: self.count(Entity::Treatment)?,
            total_bills: self.count(Entity::Bill)?,
            unpaid_bills: self.count_unpaid_bills()?,
            recent_appointments: self.recent_appointments(RECENT_LIMIT)?,
            recent_patients: self.recent_patients(RECENT_LIMIT)?,
        };

        tx.finish()?;
        tracing::debug!(
            patients = dashboard.total_patients,
            unpaid_bills = dashboard.unpaid_bills,
            "dashboard computed"
        );
        Ok(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodGroup, Gender, PatientData};
    use chrono::NaiveDate;

    #[test]
    fn test_empty_dashboard() {
        let db = Database::open_in_memory().unwrap();
        let dashboard = db.dashboard().unwrap();

        assert_eq!(dashboard.total_patients, 0);
        assert_eq!(dashboard.unpaid_bills, 0);
        assert!(dashboard.recent_appointments.is_empty());
        assert!(dashboard.recent_patients.is_empty());
    }

    #[test]
    fn test_recent_patients_capped() {
        let db = Database::open_in_memory().unwrap();
        for day in 1..=8 {
            db.insert_patient(&PatientData {
                name: format!("Patient {}", day),
                age: 20 + day,
                gender: Gender::Male,
                blood_group: BloodGroup::ANegative,
                phone: "555-0130".into(),
                email: None,
                address: String::new(),
                date_registered: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            })
            .unwrap();
        }

        let dashboard = db.dashboard().unwrap();
        assert_eq!(dashboard.total_patients, 8);
        assert_eq!(dashboard.recent_patients.len(), RECENT_LIMIT);
        assert_eq!(dashboard.recent_patients[0].name, "Patient 8");
    }
}
