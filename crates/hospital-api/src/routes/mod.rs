//! REST routes. One module per entity, each exposing its own `router()`.

mod appointments;
mod bills;
mod doctors;
mod patients;
mod treatments;

use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use hospital_core::{Dashboard, FormData};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .nest("/patients", patients::router())
        .nest("/doctors", doctors::router())
        .nest("/appointments", appointments::router())
        .nest("/treatments", treatments::router())
        .nest("/bills", bills::router())
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    info!("GET / - dashboard");
    let dashboard = state.run(|clinic| clinic.dashboard())?;
    Ok(Json(dashboard))
}

/// Flatten a JSON object into form input. Nulls count as not submitted.
pub(crate) fn form_data(body: Map<String, Value>) -> FormData {
    body.into_iter()
        .filter_map(|(key, value)| {
            let raw = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, raw))
        })
        .collect()
}

/// Split list query parameters into the page number and filter input.
pub(crate) fn list_params(mut query: HashMap<String, String>) -> Result<(u32, FormData), ApiError> {
    let page = match query.remove("page") {
        None => 1,
        Some(raw) if raw.trim().is_empty() => 1,
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::NotFound(format!("Invalid page: {}", raw)))?,
    };
    Ok((page, query.into_iter().collect()))
}
