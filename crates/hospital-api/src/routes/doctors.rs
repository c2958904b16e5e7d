use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hospital_core::validation::doctor_filter;
use hospital_core::{CascadeSummary, Doctor, Outcome, Page};
use serde_json::{Map, Value};
use tracing::info;

use super::{form_data, list_params};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_doctors).post(create_doctor))
        .route(
            "/{id}",
            get(get_doctor).put(update_doctor).delete(delete_doctor),
        )
}

async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Page<Doctor>>, ApiError> {
    info!("GET /doctors - query: {:?}", query);
    let (page, filters) = list_params(query)?;
    let filter = doctor_filter(&filters).map_err(|e| ApiError::invalid(e, &filters))?;
    Ok(Json(state.run(|clinic| clinic.list_doctors(&filter, page))?))
}

async fn create_doctor(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Outcome<Doctor>>), ApiError> {
    info!("POST /doctors");
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.create_doctor(&form))
        .map_err(|e| e.with_values(&form))?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Doctor>, ApiError> {
    info!("GET /doctors/{}", id);
    Ok(Json(state.run(|clinic| clinic.get_doctor(id))?))
}

async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Outcome<Doctor>>, ApiError> {
    info!("PUT /doctors/{}", id);
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.update_doctor(id, &form))
        .map_err(|e| e.with_values(&form))?;
    Ok(Json(outcome))
}

async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Outcome<CascadeSummary>>, ApiError> {
    info!("DELETE /doctors/{}", id);
    Ok(Json(state.run(|clinic| clinic.delete_doctor(id))?))
}
