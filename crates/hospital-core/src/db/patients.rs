//! Patient database operations.

use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::query::{Conditions, ListQuery};
use super::rows::{PatientRow, PATIENT_COLUMNS};
use super::{CascadeSummary, Database, DbError, DbResult, Page};
use crate::models::{BloodGroup, Entity, Gender, Patient, PatientData};

/// Default patient ordering: most recently registered first.
pub(crate) const PATIENT_ORDER: &str = "p.date_registered DESC, p.id DESC";

/// Patient list filters. Search matches name, email or phone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientFilter {
    pub search: Option<String>,
    pub gender: Option<Gender>,
    pub blood_group: Option<BloodGroup>,
}

impl Database {
    /// Insert a new patient and return it with its assigned ID.
    pub fn insert_patient(&self, data: &PatientData) -> DbResult<Patient> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                name, age, gender, blood_group, phone, email, address, date_registered
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.name,
                data.age,
                data.gender.as_str(),
                data.blood_group.as_str(),
                data.phone,
                data.email,
                data.address,
                data.date_registered,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, "patient registered");
        Ok(Patient::new(id, data.clone()))
    }

    /// Replace every field of an existing patient.
    pub fn update_patient(&self, id: i64, data: &PatientData) -> DbResult<Patient> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                age = ?3,
                gender = ?4,
                blood_group = ?5,
                phone = ?6,
                email = ?7,
                address = ?8,
                date_registered = ?9
            WHERE id = ?1
            "#,
            params![
                id,
                data.name,
                data.age,
                data.gender.as_str(),
                data.blood_group.as_str(),
                data.phone,
                data.email,
                data.address,
                data.date_registered,
            ],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Patient,
                id,
            });
        }
        tracing::info!(id, "patient updated");
        Ok(Patient::new(id, data.clone()))
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients p WHERE p.id = ?");
        self.conn
            .query_row(&sql, [id], PatientRow::read_first)
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// List patients, newest registration first.
    pub fn list_patients(&self, filter: &PatientFilter, page: u32) -> DbResult<Page<Patient>> {
        let mut conditions = Conditions::new();
        conditions
            .equals(
                "p.gender",
                filter.gender.map(|g| Value::Text(g.as_str().into())),
            )
            .equals(
                "p.blood_group",
                filter.blood_group.map(|b| Value::Text(b.as_str().into())),
            )
            .search(
                &["p.name", "p.email", "p.phone"],
                filter.search.as_deref(),
            );

        let query = ListQuery {
            select: format!("SELECT {PATIENT_COLUMNS} FROM patients p"),
            count_from: "patients p",
            order_by: PATIENT_ORDER,
            conditions,
        };
        self.fetch_page(&query, page, PatientRow::read_first)
    }

    /// The `limit` most recently registered patients.
    pub fn recent_patients(&self, limit: usize) -> DbResult<Vec<Patient>> {
        self.fetch_limited(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients p"),
            PATIENT_ORDER,
            limit,
            PatientRow::read_first,
        )
    }

    /// Delete a patient with their appointments, and every treatment and bill
    /// attached to those appointments or to the patient.
    pub fn delete_patient(&self, id: i64) -> DbResult<CascadeSummary> {
        let tx = self.conn.unchecked_transaction()?;

        let mut summary = self.delete_appointments_where("patient_id = ?1", id)?;
        summary.bills += tx.execute("DELETE FROM bills WHERE patient_id = ?1", [id])?;
        summary.patients = tx.execute("DELETE FROM patients WHERE id = ?1", [id])?;

        if summary.patients == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Patient,
                id,
            });
        }

        tx.commit()?;
        tracing::info!(id, ?summary, "patient deleted");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn patient(name: &str, registered: (i32, u32, u32)) -> PatientData {
        PatientData {
            name: name.into(),
            age: 30,
            gender: Gender::Female,
            blood_group: BloodGroup::APositive,
            phone: "555-0100".into(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            address: "1 Main St".into(),
            date_registered: NaiveDate::from_ymd_opt(registered.0, registered.1, registered.2)
                .unwrap(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let created = db.insert_patient(&patient("Maya", (2024, 1, 5))).unwrap();
        let retrieved = db.get_patient(created.id).unwrap().unwrap();

        assert_eq!(retrieved, created);
        assert_eq!(retrieved.gender, Gender::Female);
        assert_eq!(retrieved.email, Some("maya@example.com".into()));
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_patient(42).unwrap().is_none());
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();
        let created = db.insert_patient(&patient("Maya", (2024, 1, 5))).unwrap();

        let mut data = PatientData::from(&created);
        data.age = 31;
        data.email = None;
        db.update_patient(created.id, &data).unwrap();

        let retrieved = db.get_patient(created.id).unwrap().unwrap();
        assert_eq!(retrieved.age, 31);
        assert_eq!(retrieved.email, None);
    }

    #[test]
    fn test_update_missing() {
        let db = setup_db();
        let result = db.update_patient(9, &patient("Ghost", (2024, 1, 1)));
        assert!(matches!(result, Err(DbError::NotFound { id: 9, .. })));
    }

    #[test]
    fn test_list_order_and_filters() {
        let db = setup_db();
        db.insert_patient(&patient("Older", (2023, 5, 1))).unwrap();
        db.insert_patient(&patient("Newer", (2024, 5, 1))).unwrap();
        let mut male = patient("Marcus", (2022, 1, 1));
        male.gender = Gender::Male;
        db.insert_patient(&male).unwrap();

        let page = db.list_patients(&PatientFilter::default(), 1).unwrap();
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older", "Marcus"]);

        let filter = PatientFilter {
            gender: Some(Gender::Male),
            ..Default::default()
        };
        let page = db.list_patients(&filter, 1).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].name, "Marcus");

        let filter = PatientFilter {
            search: Some("NEW".into()),
            ..Default::default()
        };
        assert_eq!(db.list_patients(&filter, 1).unwrap().total_count, 1);
    }

    #[test]
    fn test_delete_missing() {
        let db = setup_db();
        assert!(matches!(
            db.delete_patient(3),
            Err(DbError::NotFound {
                entity: Entity::Patient,
                ..
            })
        ));
    }
}
