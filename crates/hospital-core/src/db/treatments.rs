//! Treatment database operations.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::query::{Conditions, ListQuery};
use super::rows::{treatment_detail_select, TreatmentDetailRow};
use super::{CascadeSummary, Database, DbError, DbResult, Page};
use crate::models::{Entity, Treatment, TreatmentData, TreatmentDetail};
use crate::validation::messages;

const TREATMENT_ORDER: &str = "t.treatment_date DESC, t.id DESC";

const TREATMENT_FROM: &str = "treatments t
     JOIN appointments a ON a.id = t.appointment_id
     JOIN patients p ON p.id = a.patient_id
     JOIN doctors d ON d.id = a.doctor_id";

/// Treatment list filters. Search matches diagnosis or patient name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatmentFilter {
    pub search: Option<String>,
}

impl Database {
    /// Record the treatment for an appointment that has none yet.
    pub fn insert_treatment(&self, data: &TreatmentData) -> DbResult<Treatment> {
        let tx = self.conn.unchecked_transaction()?;
        self.require_treatable(data.appointment_id, None)?;

        tx.execute(
            r#"
            INSERT INTO treatments (appointment_id, diagnosis, prescription, notes, treatment_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.appointment_id,
                data.diagnosis,
                data.prescription,
                data.notes,
                data.treatment_date,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, appointment_id = data.appointment_id, "treatment recorded");
        Ok(Treatment::new(id, data.clone()))
    }

    /// Rewrite a treatment. It may stay on its own appointment.
    pub fn update_treatment(&self, id: i64, data: &TreatmentData) -> DbResult<Treatment> {
        let tx = self.conn.unchecked_transaction()?;
        if !self.exists(Entity::Treatment, id)? {
            return Err(DbError::NotFound {
                entity: Entity::Treatment,
                id,
            });
        }
        self.require_treatable(data.appointment_id, Some(id))?;

        tx.execute(
            r#"
            UPDATE treatments SET
                appointment_id = ?2,
                diagnosis = ?3,
                prescription = ?4,
                notes = ?5,
                treatment_date = ?6
            WHERE id = ?1
            "#,
            params![
                id,
                data.appointment_id,
                data.diagnosis,
                data.prescription,
                data.notes,
                data.treatment_date,
            ],
        )?;
        tx.commit()?;

        tracing::info!(id, "treatment updated");
        Ok(Treatment::new(id, data.clone()))
    }

    /// Get a treatment with its appointment, patient and doctor.
    pub fn get_treatment(&self, id: i64) -> DbResult<Option<TreatmentDetail>> {
        let sql = format!("{} WHERE t.id = ?", treatment_detail_select());
        self.conn
            .query_row(&sql, [id], TreatmentDetailRow::read_first)
            .optional()?
            .map(TreatmentDetail::try_from)
            .transpose()
    }

    /// List treatments, latest first.
    pub fn list_treatments(
        &self,
        filter: &TreatmentFilter,
        page: u32,
    ) -> DbResult<Page<TreatmentDetail>> {
        let mut conditions = Conditions::new();
        conditions.search(&["t.diagnosis", "p.name"], filter.search.as_deref());

        let query = ListQuery {
            select: treatment_detail_select(),
            count_from: TREATMENT_FROM,
            order_by: TREATMENT_ORDER,
            conditions,
        };
        self.fetch_page(&query, page, TreatmentDetailRow::read_first)
    }

    /// Delete a single treatment. Nothing depends on it.
    pub fn delete_treatment(&self, id: i64) -> DbResult<CascadeSummary> {
        let treatments = self
            .conn
            .execute("DELETE FROM treatments WHERE id = ?1", [id])?;
        if treatments == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Treatment,
                id,
            });
        }

        tracing::info!(id, "treatment deleted");
        Ok(CascadeSummary {
            treatments,
            ..Default::default()
        })
    }

    /// Treatment already recorded for an appointment.
    fn treatment_for_appointment(&self, appointment_id: i64) -> DbResult<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM treatments WHERE appointment_id = ?",
                [appointment_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// The appointment must exist and carry no treatment other than `current`.
    fn require_treatable(&self, appointment_id: i64, current: Option<i64>) -> DbResult<()> {
        self.require_reference("appointment", Entity::Appointment, appointment_id)?;

        match self.treatment_for_appointment(appointment_id)? {
            Some(other) if Some(other) != current => {
                tracing::warn!(appointment_id, other, "appointment already treated");
                Err(DbError::Integrity {
                    field: "appointment",
                    message: messages::DUPLICATE_TREATMENT.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
