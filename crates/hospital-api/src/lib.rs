//! HTTP surface for the hospital records core.
//!
//! JSON in, JSON out. Request bodies are flat objects whose values are
//! taken as form input; rejected input comes back as `422` with the
//! per-field errors and the submitted values.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

/// Build the application router over an open database.
pub fn create_router(state: AppState) -> Router {
    routes::router().with_state(state)
}
