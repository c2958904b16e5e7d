//! SQLite schema definition.

/// Complete database schema: one table per entity.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 0),
    gender TEXT NOT NULL CHECK (gender IN ('M', 'F', 'O')),
    blood_group TEXT NOT NULL
        CHECK (blood_group IN ('A+', 'A-', 'B+', 'B-', 'AB+', 'AB-', 'O+', 'O-')),
    phone TEXT NOT NULL,
    email TEXT,
    address TEXT NOT NULL DEFAULT '',
    date_registered TEXT NOT NULL                -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS idx_patients_date_registered ON patients(date_registered);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Doctors
-- ============================================================================

CREATE TABLE IF NOT EXISTS doctors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    specialization TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT,
    available_days TEXT NOT NULL,
    available_time TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_doctors_name ON doctors(name);

-- ============================================================================
-- Appointments
-- ============================================================================

-- No ON DELETE actions: dependents are removed explicitly by the store, and
-- any row it misses makes the parent delete fail instead of orphaning.
CREATE TABLE IF NOT EXISTS appointments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id),
    doctor_id INTEGER NOT NULL REFERENCES doctors(id),
    date TEXT NOT NULL,                          -- YYYY-MM-DD
    time TEXT NOT NULL,                          -- HH:MM:SS
    status TEXT NOT NULL DEFAULT 'Scheduled'
        CHECK (status IN ('Scheduled', 'Completed', 'Cancelled')),
    notes TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS idx_appointments_doctor ON appointments(doctor_id);
CREATE INDEX IF NOT EXISTS idx_appointments_when ON appointments(date, time);

-- ============================================================================
-- Treatments (one per appointment)
-- ============================================================================

CREATE TABLE IF NOT EXISTS treatments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    appointment_id INTEGER NOT NULL UNIQUE REFERENCES appointments(id),
    diagnosis TEXT NOT NULL,
    prescription TEXT NOT NULL,
    notes TEXT NOT NULL DEFAULT '',
    treatment_date TEXT NOT NULL                 -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS idx_treatments_date ON treatments(treatment_date);

-- ============================================================================
-- Bills
-- ============================================================================

CREATE TABLE IF NOT EXISTS bills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id),
    appointment_id INTEGER NOT NULL REFERENCES appointments(id),
    amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0 AND amount_cents < 10000000000),
    paid INTEGER NOT NULL DEFAULT 0 CHECK (paid IN (0, 1)),
    date_issued TEXT NOT NULL,                   -- YYYY-MM-DD
    payment_method TEXT NOT NULL DEFAULT ''      -- '' until set
        CHECK (payment_method IN ('', 'Cash', 'Card', 'Insurance', 'Online'))
);

CREATE INDEX IF NOT EXISTS idx_bills_patient ON bills(patient_id);
CREATE INDEX IF NOT EXISTS idx_bills_appointment ON bills(appointment_id);
CREATE INDEX IF NOT EXISTS idx_bills_paid ON bills(paid);
CREATE INDEX IF NOT EXISTS idx_bills_date_issued ON bills(date_issued);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use crate::validation::fields_for;
    use rusqlite::Connection;

    fn columns(conn: &Connection, table: &str) -> Vec<String> {
        conn.prepare(&format!("PRAGMA table_info({})", table))
            .unwrap()
            .query_map([], |row| row.get(1))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_field_tables_match_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        for entity in Entity::ALL {
            let cols = columns(&conn, entity.table());
            for spec in fields_for(entity) {
                assert!(
                    cols.iter().any(|c| c == spec.column),
                    "{}.{} has no column {}",
                    entity,
                    spec.name,
                    spec.column
                );
            }
        }
    }

    #[test]
    fn test_check_constraints() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO patients (name, age, gender, blood_group, phone, date_registered)
             VALUES ('A', -1, 'M', 'O+', '1', '2024-01-01')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO patients (name, age, gender, blood_group, phone, date_registered)
             VALUES ('A', 1, 'X', 'O+', '1', '2024-01-01')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO appointments (patient_id, doctor_id, date, time)
             VALUES (1, 1, '2024-01-01', '09:00:00')",
            [],
        );
        assert!(result.is_err());
    }
}
