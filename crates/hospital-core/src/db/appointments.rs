//! Appointment database operations.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::query::{Conditions, ListQuery};
use super::rows::{appointment_detail_select, AppointmentDetailRow};
use super::{CascadeSummary, Database, DbError, DbResult, Page};
use crate::models::{Appointment, AppointmentData, AppointmentDetail, AppointmentStatus, Entity};
use crate::validation::messages;

/// Most recent first; same-day appointments by time.
const APPOINTMENT_ORDER: &str = "a.date DESC, a.time DESC, a.id DESC";

const APPOINTMENT_FROM: &str = "appointments a
     JOIN patients p ON p.id = a.patient_id
     JOIN doctors d ON d.id = a.doctor_id";

/// Appointment list filters. Search matches patient or doctor name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub search: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
}

impl Database {
    /// Book an appointment. Both parties must exist.
    pub fn insert_appointment(&self, data: &AppointmentData) -> DbResult<Appointment> {
        let tx = self.conn.unchecked_transaction()?;
        self.require_reference("patient", Entity::Patient, data.patient_id)?;
        self.require_reference("doctor", Entity::Doctor, data.doctor_id)?;

        tx.execute(
            r#"
            INSERT INTO appointments (patient_id, doctor_id, date, time, status, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.patient_id,
                data.doctor_id,
                data.date,
                data.time,
                data.status.as_str(),
                data.notes,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(
            id,
            patient_id = data.patient_id,
            doctor_id = data.doctor_id,
            "appointment scheduled"
        );
        Ok(Appointment::new(id, data.clone()))
    }

    /// Rewrite an appointment. A billed appointment keeps its patient.
    pub fn update_appointment(&self, id: i64, data: &AppointmentData) -> DbResult<Appointment> {
        let tx = self.conn.unchecked_transaction()?;
        let owner: i64 = tx
            .query_row(
                "SELECT patient_id FROM appointments WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(DbError::NotFound {
                entity: Entity::Appointment,
                id,
            })?;
        self.require_reference("patient", Entity::Patient, data.patient_id)?;
        self.require_reference("doctor", Entity::Doctor, data.doctor_id)?;

        if owner != data.patient_id {
            let billed: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM bills WHERE appointment_id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            if billed {
                tracing::warn!(
                    id,
                    owner,
                    patient_id = data.patient_id,
                    "billed appointment cannot change patient"
                );
                return Err(DbError::Integrity {
                    field: "patient",
                    message: messages::APPOINTMENT_BILLED_TO_PATIENT.to_string(),
                });
            }
        }

        tx.execute(
            r#"
            UPDATE appointments SET
                patient_id = ?2,
                doctor_id = ?3,
                date = ?4,
                time = ?5,
                status = ?6,
                notes = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                data.patient_id,
                data.doctor_id,
                data.date,
                data.time,
                data.status.as_str(),
                data.notes,
            ],
        )?;
        tx.commit()?;

        tracing::info!(id, status = %data.status, "appointment updated");
        Ok(Appointment::new(id, data.clone()))
    }

    /// Get an appointment with its patient and doctor.
    pub fn get_appointment(&self, id: i64) -> DbResult<Option<AppointmentDetail>> {
        let sql = format!("{} WHERE a.id = ?", appointment_detail_select());
        self.conn
            .query_row(&sql, [id], AppointmentDetailRow::read_first)
            .optional()?
            .map(AppointmentDetail::try_from)
            .transpose()
    }

    /// List appointments, latest first, with both parties loaded.
    pub fn list_appointments(
        &self,
        filter: &AppointmentFilter,
        page: u32,
    ) -> DbResult<Page<AppointmentDetail>> {
        let mut conditions = Conditions::new();
        conditions
            .equals(
                "a.status",
                filter.status.map(|s| Value::Text(s.as_str().into())),
            )
            .equals(
                "a.date",
                filter.date.map(|d| Value::Text(d.format("%Y-%m-%d").to_string())),
            )
            .search(&["p.name", "d.name"], filter.search.as_deref());

        let query = ListQuery {
            select: appointment_detail_select(),
            count_from: APPOINTMENT_FROM,
            order_by: APPOINTMENT_ORDER,
            conditions,
        };
        self.fetch_page(&query, page, AppointmentDetailRow::read_first)
    }

    /// The `limit` latest appointments by date and time.
    pub fn recent_appointments(&self, limit: usize) -> DbResult<Vec<AppointmentDetail>> {
        self.fetch_limited(
            &appointment_detail_select(),
            APPOINTMENT_ORDER,
            limit,
            AppointmentDetailRow::read_first,
        )
    }

    /// Delete an appointment with its treatment and bills.
    pub fn delete_appointment(&self, id: i64) -> DbResult<CascadeSummary> {
        let tx = self.conn.unchecked_transaction()?;

        let summary = self.delete_appointments_where("id = ?1", id)?;
        if summary.appointments == 0 {
            return Err(DbError::NotFound {
                entity: Entity::Appointment,
                id,
            });
        }

        tx.commit()?;
        tracing::info!(id, ?summary, "appointment deleted");
        Ok(summary)
    }

    /// Delete the appointments matching `predicate` (bound to `?1 = id`)
    /// together with their treatments and bills.
    ///
    /// Runs inside the caller's transaction.
    pub(crate) fn delete_appointments_where(
        &self,
        predicate: &'static str,
        id: i64,
    ) -> DbResult<CascadeSummary> {
        let matching = format!("SELECT id FROM appointments WHERE {predicate}");

        let treatments = self.conn.execute(
            &format!("DELETE FROM treatments WHERE appointment_id IN ({matching})"),
            [id],
        )?;
        let bills = self.conn.execute(
            &format!("DELETE FROM bills WHERE appointment_id IN ({matching})"),
            [id],
        )?;
        let appointments = self
            .conn
            .execute(&format!("DELETE FROM appointments WHERE {predicate}"), [id])?;

        tracing::debug!(predicate, id, appointments, treatments, bills, "cascaded");
        Ok(CascadeSummary {
            appointments,
            treatments,
            bills,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodGroup, DoctorData, Gender, PatientData};
    use chrono::NaiveTime;

    struct Fixture {
        db: Database,
        patient_id: i64,
        doctor_id: i64,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let patient = db
            .insert_patient(&PatientData {
                name: "Ana Lopez".into(),
                age: 28,
                gender: Gender::Female,
                blood_group: BloodGroup::BNegative,
                phone: "555-0101".into(),
                email: None,
                address: String::new(),
                date_registered: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .unwrap();
        let doctor = db
            .insert_doctor(&DoctorData {
                name: "Okafor".into(),
                specialization: "Pediatrics".into(),
                phone: "555-0102".into(),
                email: None,
                available_days: "Tue, Thu".into(),
                available_time: "8:00 AM - 2:00 PM".into(),
            })
            .unwrap();
        Fixture {
            db,
            patient_id: patient.id,
            doctor_id: doctor.id,
        }
    }

    fn booking(f: &Fixture, day: u32, hour: u32) -> AppointmentData {
        AppointmentData {
            patient_id: f.patient_id,
            doctor_id: f.doctor_id,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
        }
    }

    #[test]
    fn test_insert_and_get_detail() {
        let f = setup();
        let created = f.db.insert_appointment(&booking(&f, 4, 9)).unwrap();

        let detail = f.db.get_appointment(created.id).unwrap().unwrap();
        assert_eq!(detail.appointment, created);
        assert_eq!(detail.patient.name, "Ana Lopez");
        assert_eq!(detail.doctor.name, "Okafor");
    }

    #[test]
    fn test_dangling_doctor_rejected() {
        let f = setup();
        let mut data = booking(&f, 4, 9);
        data.doctor_id = 999;

        let result = f.db.insert_appointment(&data);
        assert!(matches!(
            result,
            Err(DbError::Integrity { field: "doctor", .. })
        ));
        assert_eq!(
            f.db.list_appointments(&AppointmentFilter::default(), 1)
                .unwrap()
                .total_count,
            0
        );
    }

    #[test]
    fn test_update_missing() {
        let f = setup();
        let result = f.db.update_appointment(5, &booking(&f, 4, 9));
        assert!(matches!(
            result,
            Err(DbError::NotFound {
                entity: Entity::Appointment,
                id: 5
            })
        ));
    }

    #[test]
    fn test_list_order_and_filters() {
        let f = setup();
        let early = f.db.insert_appointment(&booking(&f, 4, 9)).unwrap();
        let late = f.db.insert_appointment(&booking(&f, 4, 15)).unwrap();
        let mut done = booking(&f, 2, 10);
        done.status = AppointmentStatus::Completed;
        let done = f.db.insert_appointment(&done).unwrap();

        let page = f
            .db
            .list_appointments(&AppointmentFilter::default(), 1)
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|a| a.appointment.id).collect();
        assert_eq!(ids, vec![late.id, early.id, done.id]);

        let filter = AppointmentFilter {
            status: Some(AppointmentStatus::Completed),
            ..Default::default()
        };
        assert_eq!(f.db.list_appointments(&filter, 1).unwrap().total_count, 1);

        let filter = AppointmentFilter {
            date: NaiveDate::from_ymd_opt(2024, 3, 4),
            search: Some("okaf".into()),
            ..Default::default()
        };
        assert_eq!(f.db.list_appointments(&filter, 1).unwrap().total_count, 2);
    }

    #[test]
    fn test_recent_appointments_limit() {
        let f = setup();
        for day in 1..=7 {
            f.db.insert_appointment(&booking(&f, day, 9)).unwrap();
        }
        let recent = f.db.recent_appointments(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].appointment.date, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    }

    #[test]
    fn test_delete_appointment() {
        let f = setup();
        let created = f.db.insert_appointment(&booking(&f, 4, 9)).unwrap();

        let summary = f.db.delete_appointment(created.id).unwrap();
        assert_eq!(summary.appointments, 1);
        assert!(f.db.get_appointment(created.id).unwrap().is_none());
        assert!(matches!(
            f.db.delete_appointment(created.id),
            Err(DbError::NotFound { .. })
        ));
    }
}
