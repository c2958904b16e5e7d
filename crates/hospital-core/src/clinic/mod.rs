//! Front-office operations.
//!
//! Each write validates raw form input, hands the result to the record
//! store, and returns the stored record together with the confirmation
//! message the boundary should show. Nothing here holds request state.

mod billing;
mod records;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::db::{Dashboard, Database, DbError};
use crate::models::Entity;
use crate::validation::FieldErrors;

/// Operation errors, grouped the way callers report them.
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i64 },

    #[error("Integrity violation on {field}: {message}")]
    Integrity { field: &'static str, message: String },

    #[error("Invalid page: {0}")]
    InvalidPage(u32),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for ClinicError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { entity, id } => ClinicError::NotFound { entity, id },
            DbError::Integrity { field, message } => ClinicError::Integrity { field, message },
            DbError::InvalidPage(page) => ClinicError::InvalidPage(page),
            other => ClinicError::Database(other),
        }
    }
}

impl From<FieldErrors> for ClinicError {
    fn from(errors: FieldErrors) -> Self {
        ClinicError::Validation(errors)
    }
}

impl ClinicError {
    /// Per-field messages for errors the caller can fix by editing input.
    ///
    /// Integrity failures are reported against the reference field that
    /// caused them.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            ClinicError::Validation(errors) => Some(errors.clone()),
            ClinicError::Integrity { field, message } => {
                Some(FieldErrors::single(field, message.clone()))
            }
            _ => None,
        }
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;

/// A successful write: the stored record and its confirmation message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub record: T,
    pub message: String,
}

impl<T> Outcome<T> {
    pub fn new(record: T, message: impl Into<String>) -> Self {
        Self {
            record,
            message: message.into(),
        }
    }
}

/// Operations over one open database.
pub struct Clinic<'a> {
    db: &'a Database,
    today: Option<NaiveDate>,
}

impl<'a> Clinic<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db, today: None }
    }

    /// Use a fixed date wherever a record date defaults to today.
    pub fn with_today(db: &'a Database, today: NaiveDate) -> Self {
        Self {
            db,
            today: Some(today),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Entity counts, unpaid bills, and the latest appointments and patients.
    pub fn dashboard(&self) -> ClinicResult<Dashboard> {
        Ok(self.db.dashboard()?)
    }
}

fn found<T>(entity: Entity, id: i64, record: Option<T>) -> ClinicResult<T> {
    record.ok_or(ClinicError::NotFound { entity, id })
}
