use std::sync::{Arc, Mutex};

use hospital_core::{Clinic, ClinicResult, Database};

use crate::error::ApiError;

/// Shared handle to the one open database.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run one operation with exclusive use of the database.
    pub fn run<T>(&self, op: impl FnOnce(&Clinic<'_>) -> ClinicResult<T>) -> Result<T, ApiError> {
        let db = self
            .db
            .lock()
            .map_err(|e| ApiError::Internal(format!("Lock poisoned: {}", e)))?;
        let clinic = Clinic::new(&db);
        Ok(op(&clinic)?)
    }
}
