//! Doctor database operations.

use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::query::{Conditions, ListQuery};
use super::rows::{DoctorRow, DOCTOR_COLUMNS};
use super::{CascadeSummary, Database, DbError, DbResult, Page};
use crate::models::{Doctor, DoctorData, Entity};

const DOCTOR_ORDER: &str = "d.name ASC, d.id ASC";

/// Doctor list filters. Search matches name, specialization or email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorFilter {
    pub search: Option<String>,
    /// Exact specialization, case-insensitive
    pub specialization: Option<String>,
}

impl Database {
    /// Add a doctor.
    pub fn insert_doctor(&self, data: &DoctorData) -> DbResult<Doctor> {
        self.conn.execute(
            r#"
            INSERT INTO doctors (
                name, specialization, phone, email, available_days, available_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.name,
                data.specialization,
                data.phone,
                data.email,
                data.available_days,
                data.available_time,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, specialization = %data.specialization, "doctor added");
        Ok(Doctor::new(id, data.clone()))
    }

    /// Rewrite a doctor's details.
    pub fn update_doctor(&self, id: i64, data: &DoctorData) -> DbResult<Doctor> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE doctors SET
                name = ?2,
                specialization = ?3,
                phone = ?4,
                email = ?5,
                available_days = ?6,
                available_time = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                data.name,
                data.specialization,
                data.phone,
                data.email,
                data.available_days,
                data.available_time,
            ],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Doctor,
                id,
            });
        }
        tracing::info!(id, "doctor updated");
        Ok(Doctor::new(id, data.clone()))
    }

    /// Get a doctor by ID.
    pub fn get_doctor(&self, id: i64) -> DbResult<Option<Doctor>> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors d WHERE d.id = ?");
        self.conn
            .query_row(&sql, [id], DoctorRow::read_first)
            .optional()?
            .map(Doctor::try_from)
            .transpose()
    }

    /// List doctors alphabetically by name.
    pub fn list_doctors(&self, filter: &DoctorFilter, page: u32) -> DbResult<Page<Doctor>> {
        let mut conditions = Conditions::new();
        conditions
            .equals(
                "LOWER(d.specialization)",
                filter
                    .specialization
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::Text(s.to_lowercase())),
            )
            .search(&["d.name", "d.specialization", "d.email"], filter.search.as_deref());

        let query = ListQuery {
            select: format!("SELECT {DOCTOR_COLUMNS} FROM doctors d"),
            count_from: "doctors d",
            order_by: DOCTOR_ORDER,
            conditions,
        };
        self.fetch_page(&query, page, DoctorRow::read_first)
    }

    /// Delete a doctor with their appointments and everything attached to them.
    pub fn delete_doctor(&self, id: i64) -> DbResult<CascadeSummary> {
        let tx = self.conn.unchecked_transaction()?;

        let mut summary = self.delete_appointments_where("doctor_id = ?1", id)?;
        summary.doctors = tx.execute("DELETE FROM doctors WHERE id = ?1", [id])?;

        if summary.doctors == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Doctor,
                id,
            });
        }

        tx.commit()?;
        tracing::info!(id, ?summary, "doctor deleted");
        Ok(summary)
    }
}
