use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hospital_core::validation::treatment_filter;
use hospital_core::{Outcome, Page, Treatment, TreatmentDetail};
use serde_json::{Map, Value};
use tracing::info;

use super::{form_data, list_params};
use crate::error::ApiError;
use crate::state::AppState;

// Treatments are removed only through their appointment.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_treatments).post(create_treatment))
        .route("/{id}", get(get_treatment).put(update_treatment))
}

async fn list_treatments(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Page<TreatmentDetail>>, ApiError> {
    info!("GET /treatments - query: {:?}", query);
    let (page, filters) = list_params(query)?;
    let filter = treatment_filter(&filters).map_err(|e| ApiError::invalid(e, &filters))?;
    Ok(Json(state.run(|clinic| clinic.list_treatments(&filter, page))?))
}

async fn create_treatment(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Outcome<Treatment>>), ApiError> {
    info!("POST /treatments");
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.create_treatment(&form))
        .map_err(|e| e.with_values(&form))?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_treatment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TreatmentDetail>, ApiError> {
    info!("GET /treatments/{}", id);
    Ok(Json(state.run(|clinic| clinic.get_treatment(id))?))
}

async fn update_treatment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Outcome<Treatment>>, ApiError> {
    info!("PUT /treatments/{}", id);
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.update_treatment(id, &form))
        .map_err(|e| e.with_values(&form))?;
    Ok(Json(outcome))
}
