use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hospital_core::validation::patient_filter;
use hospital_core::{CascadeSummary, Outcome, Page, Patient};
use serde_json::{Map, Value};
use tracing::info;

use super::{form_data, list_params};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route(
            "/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
}

async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Page<Patient>>, ApiError> {
    info!("GET /patients - query: {:?}", query);
    let (page, filters) = list_params(query)?;
    let filter = patient_filter(&filters).map_err(|e| ApiError::invalid(e, &filters))?;
    let patients = state.run(|clinic| clinic.list_patients(&filter, page))?;
    Ok(Json(patients))
}

async fn create_patient(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Outcome<Patient>>), ApiError> {
    info!("POST /patients");
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.create_patient(&form))
        .map_err(|e| e.with_values(&form))?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    info!("GET /patients/{}", id);
    Ok(Json(state.run(|clinic| clinic.get_patient(id))?))
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Outcome<Patient>>, ApiError> {
    info!("PUT /patients/{}", id);
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.update_patient(id, &form))
        .map_err(|e| e.with_values(&form))?;
    Ok(Json(outcome))
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Outcome<CascadeSummary>>, ApiError> {
    info!("DELETE /patients/{}", id);
    Ok(Json(state.run(|clinic| clinic.delete_patient(id))?))
}
