//! Intermediate row structs and column lists for database mapping.
//!
//! Each `*Row::read` takes the index of its first column, so the same reader
//! works for a plain select and for its slice of a joined select.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Row;

use super::DbError;
use crate::models::{
    Appointment, AppointmentDetail, AppointmentStatus, Bill, BillDetail, BloodGroup, Doctor,
    Gender, Money, Patient, PaymentMethod, Treatment, TreatmentDetail,
};

pub(crate) const PATIENT_COLUMNS: &str =
    "p.id, p.name, p.age, p.gender, p.blood_group, p.phone, p.email, p.address, p.date_registered";
pub(crate) const DOCTOR_COLUMNS: &str =
    "d.id, d.name, d.specialization, d.phone, d.email, d.available_days, d.available_time";
pub(crate) const APPOINTMENT_COLUMNS: &str =
    "a.id, a.patient_id, a.doctor_id, a.date, a.time, a.status, a.notes";
pub(crate) const TREATMENT_COLUMNS: &str =
    "t.id, t.appointment_id, t.diagnosis, t.prescription, t.notes, t.treatment_date";
pub(crate) const BILL_COLUMNS: &str =
    "b.id, b.patient_id, b.appointment_id, b.amount_cents, b.paid, b.date_issued, b.payment_method";

const PATIENT_WIDTH: usize = 9;
const DOCTOR_WIDTH: usize = 7;
const APPOINTMENT_WIDTH: usize = 7;
const TREATMENT_WIDTH: usize = 6;
const BILL_WIDTH: usize = 7;

fn unknown(column: &str, value: &str) -> DbError {
    DbError::Constraint(format!("Unknown {} value: {}", column, value))
}

pub(crate) struct PatientRow {
    id: i64,
    name: String,
    age: i64,
    gender: String,
    blood_group: String,
    phone: String,
    email: Option<String>,
    address: String,
    date_registered: NaiveDate,
}

impl PatientRow {
    pub(crate) fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            age: row.get(at + 2)?,
            gender: row.get(at + 3)?,
            blood_group: row.get(at + 4)?,
            phone: row.get(at + 5)?,
            email: row.get(at + 6)?,
            address: row.get(at + 7)?,
            date_registered: row.get(at + 8)?,
        })
    }

    pub(crate) fn read_first(row: &Row<'_>) -> rusqlite::Result<Self> {
        Self::read(row, 0)
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            name: row.name,
            age: u32::try_from(row.age).map_err(|_| unknown("age", &row.age.to_string()))?,
            gender: Gender::parse(&row.gender).ok_or_else(|| unknown("gender", &row.gender))?,
            blood_group: BloodGroup::parse(&row.blood_group)
                .ok_or_else(|| unknown("blood_group", &row.blood_group))?,
            phone: row.phone,
            email: row.email,
            address: row.address,
            date_registered: row.date_registered,
        })
    }
}

pub(crate) struct DoctorRow {
    id: i64,
    name: String,
    specialization: String,
    phone: String,
    email: Option<String>,
    available_days: String,
    available_time: String,
}

impl DoctorRow {
    pub(crate) fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            name: row.get(at + 1)?,
            specialization: row.get(at + 2)?,
            phone: row.get(at + 3)?,
            email: row.get(at + 4)?,
            available_days: row.get(at + 5)?,
            available_time: row.get(at + 6)?,
        })
    }

    pub(crate) fn read_first(row: &Row<'_>) -> rusqlite::Result<Self> {
        Self::read(row, 0)
    }
}

impl TryFrom<DoctorRow> for Doctor {
    type Error = DbError;

    fn try_from(row: DoctorRow) -> Result<Self, Self::Error> {
        Ok(Doctor {
            id: row.id,
            name: row.name,
            specialization: row.specialization,
            phone: row.phone,
            email: row.email,
            available_days: row.available_days,
            available_time: row.available_time,
        })
    }
}

pub(crate) struct AppointmentRow {
    id: i64,
    patient_id: i64,
    doctor_id: i64,
    date: NaiveDate,
    time: NaiveTime,
    status: String,
    notes: String,
}

impl AppointmentRow {
    pub(crate) fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            patient_id: row.get(at + 1)?,
            doctor_id: row.get(at + 2)?,
            date: row.get(at + 3)?,
            time: row.get(at + 4)?,
            status: row.get(at + 5)?,
            notes: row.get(at + 6)?,
        })
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            date: row.date,
            time: row.time,
            status: AppointmentStatus::parse(&row.status)
                .ok_or_else(|| unknown("status", &row.status))?,
            notes: row.notes,
        })
    }
}

pub(crate) struct TreatmentRow {
    id: i64,
    appointment_id: i64,
    diagnosis: String,
    prescription: String,
    notes: String,
    treatment_date: NaiveDate,
}

impl TreatmentRow {
    pub(crate) fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            appointment_id: row.get(at + 1)?,
            diagnosis: row.get(at + 2)?,
            prescription: row.get(at + 3)?,
            notes: row.get(at + 4)?,
            treatment_date: row.get(at + 5)?,
        })
    }
}

impl TryFrom<TreatmentRow> for Treatment {
    type Error = DbError;

    fn try_from(row: TreatmentRow) -> Result<Self, Self::Error> {
        Ok(Treatment {
            id: row.id,
            appointment_id: row.appointment_id,
            diagnosis: row.diagnosis,
            prescription: row.prescription,
            notes: row.notes,
            treatment_date: row.treatment_date,
        })
    }
}

pub(crate) struct BillRow {
    id: i64,
    patient_id: i64,
    appointment_id: i64,
    amount_cents: i64,
    paid: bool,
    date_issued: NaiveDate,
    payment_method: String,
}

impl BillRow {
    pub(crate) fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(at)?,
            patient_id: row.get(at + 1)?,
            appointment_id: row.get(at + 2)?,
            amount_cents: row.get(at + 3)?,
            paid: row.get(at + 4)?,
            date_issued: row.get(at + 5)?,
            payment_method: row.get(at + 6)?,
        })
    }
}

impl TryFrom<BillRow> for Bill {
    type Error = DbError;

    fn try_from(row: BillRow) -> Result<Self, Self::Error> {
        let payment_method = match row.payment_method.as_str() {
            "" => None,
            other => Some(
                PaymentMethod::parse(other).ok_or_else(|| unknown("payment_method", other))?,
            ),
        };

        Ok(Bill {
            id: row.id,
            patient_id: row.patient_id,
            appointment_id: row.appointment_id,
            amount: Money::from_cents(row.amount_cents)
                .map_err(|_| unknown("amount_cents", &row.amount_cents.to_string()))?,
            paid: row.paid,
            date_issued: row.date_issued,
            payment_method,
        })
    }
}

/// Appointment, then patient, then doctor columns.
pub(crate) struct AppointmentDetailRow {
    appointment: AppointmentRow,
    patient: PatientRow,
    doctor: DoctorRow,
}

impl AppointmentDetailRow {
    pub(crate) fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            appointment: AppointmentRow::read(row, at)?,
            patient: PatientRow::read(row, at + APPOINTMENT_WIDTH)?,
            doctor: DoctorRow::read(row, at + APPOINTMENT_WIDTH + PATIENT_WIDTH)?,
        })
    }

    pub(crate) fn read_first(row: &Row<'_>) -> rusqlite::Result<Self> {
        Self::read(row, 0)
    }
}

impl TryFrom<AppointmentDetailRow> for AppointmentDetail {
    type Error = DbError;

    fn try_from(row: AppointmentDetailRow) -> Result<Self, Self::Error> {
        Ok(AppointmentDetail {
            appointment: row.appointment.try_into()?,
            patient: row.patient.try_into()?,
            doctor: row.doctor.try_into()?,
        })
    }
}

/// Treatment columns, then a full appointment detail.
pub(crate) struct TreatmentDetailRow {
    treatment: TreatmentRow,
    appointment: AppointmentDetailRow,
}

impl TreatmentDetailRow {
    pub(crate) fn read_first(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            treatment: TreatmentRow::read(row, 0)?,
            appointment: AppointmentDetailRow::read(row, TREATMENT_WIDTH)?,
        })
    }
}

impl TryFrom<TreatmentDetailRow> for TreatmentDetail {
    type Error = DbError;

    fn try_from(row: TreatmentDetailRow) -> Result<Self, Self::Error> {
        Ok(TreatmentDetail {
            treatment: row.treatment.try_into()?,
            appointment: row.appointment.try_into()?,
        })
    }
}

/// Bill, then patient, then appointment columns.
pub(crate) struct BillDetailRow {
    bill: BillRow,
    patient: PatientRow,
    appointment: AppointmentRow,
}

impl BillDetailRow {
    pub(crate) fn read_first(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            bill: BillRow::read(row, 0)?,
            patient: PatientRow::read(row, BILL_WIDTH)?,
            appointment: AppointmentRow::read(row, BILL_WIDTH + PATIENT_WIDTH)?,
        })
    }
}

impl TryFrom<BillDetailRow> for BillDetail {
    type Error = DbError;

    fn try_from(row: BillDetailRow) -> Result<Self, Self::Error> {
        Ok(BillDetail {
            bill: row.bill.try_into()?,
            patient: row.patient.try_into()?,
            appointment: row.appointment.try_into()?,
        })
    }
}

/// `SELECT ... FROM` prefix for appointment details (alias `a`, `p`, `d`).
pub(crate) fn appointment_detail_select() -> String {
    format!(
        "SELECT {APPOINTMENT_COLUMNS}, {PATIENT_COLUMNS}, {DOCTOR_COLUMNS}
         FROM appointments a
         JOIN patients p ON p.id = a.patient_id
         JOIN doctors d ON d.id = a.doctor_id"
    )
}

/// `SELECT ... FROM` prefix for treatment details (alias `t`, `a`, `p`, `d`).
pub(crate) fn treatment_detail_select() -> String {
    format!(
        "SELECT {TREATMENT_COLUMNS}, {APPOINTMENT_COLUMNS}, {PATIENT_COLUMNS}, {DOCTOR_COLUMNS}
         FROM treatments t
         JOIN appointments a ON a.id = t.appointment_id
         JOIN patients p ON p.id = a.patient_id
         JOIN doctors d ON d.id = a.doctor_id"
    )
}

/// `SELECT ... FROM` prefix for bill details (alias `b`, `p`, `a`).
pub(crate) fn bill_detail_select() -> String {
    format!(
        "SELECT {BILL_COLUMNS}, {PATIENT_COLUMNS}, {APPOINTMENT_COLUMNS}
         FROM bills b
         JOIN patients p ON p.id = b.patient_id
         JOIN appointments a ON a.id = b.appointment_id"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(columns: &str) -> usize {
        columns.split(',').count()
    }

    #[test]
    fn test_widths_match_column_lists() {
        assert_eq!(width(PATIENT_COLUMNS), PATIENT_WIDTH);
        assert_eq!(width(DOCTOR_COLUMNS), DOCTOR_WIDTH);
        assert_eq!(width(APPOINTMENT_COLUMNS), APPOINTMENT_WIDTH);
        assert_eq!(width(TREATMENT_COLUMNS), TREATMENT_WIDTH);
        assert_eq!(width(BILL_COLUMNS), BILL_WIDTH);
    }
}
