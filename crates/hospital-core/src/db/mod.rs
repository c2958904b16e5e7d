//! Record store: SQLite persistence for the five hospital entities.
//!
//! Foreign keys are enforced by SQLite, but cascades are not declared in the
//! schema. Each delete removes its dependents explicitly inside one
//! transaction, so a failed cascade leaves nothing half-deleted.

mod appointments;
mod bills;
mod dashboard;
mod doctors;
mod page;
mod patients;
mod query;
mod rows;
mod schema;
mod treatments;

pub use appointments::*;
pub use bills::*;
pub use dashboard::*;
pub use doctors::*;
pub use page::*;
pub use patients::*;
pub use schema::*;
pub use treatments::*;

use rusqlite::{Connection, ErrorCode, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::Entity;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i64 },

    /// A reference field points at a row that does not exist, or breaks a
    /// cardinality rule.
    #[error("Integrity violation on {field}: {message}")]
    Integrity { field: &'static str, message: String },

    #[error("Invalid page: {0}")]
    InvalidPage(u32),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl DbError {
    /// True if SQLite itself rejected a write on a constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
        )
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Rows removed by a delete, dependents included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeSummary {
    pub patients: usize,
    pub doctors: usize,
    pub appointments: usize,
    pub treatments: usize,
    pub bills: usize,
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Whether a row with this ID exists.
    pub fn exists(&self, entity: Entity, id: i64) -> DbResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)",
            entity.table()
        );
        Ok(self.conn.query_row(&sql, [id], |row| row.get(0))?)
    }

    /// Fail with an integrity error if `id` does not resolve.
    fn require_reference(&self, field: &'static str, entity: Entity, id: i64) -> DbResult<()> {
        if self.exists(entity, id)? {
            Ok(())
        } else {
            tracing::warn!(field, %entity, id, "rejected dangling reference");
            Err(DbError::Integrity {
                field,
                message: crate::validation::messages::INVALID_REFERENCE.to_string(),
            })
        }
    }

    /// Patient that owns an appointment, if the appointment exists.
    fn appointment_owner(&self, appointment_id: i64) -> DbResult<Option<i64>> {
        self.conn
            .query_row(
                "SELECT patient_id FROM appointments WHERE id = ?",
                [appointment_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}
