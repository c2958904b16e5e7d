use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hospital_core::validation::appointment_filter;
use hospital_core::{Appointment, AppointmentDetail, CascadeSummary, Outcome, Page};
use serde_json::{Map, Value};
use tracing::info;

use super::{form_data, list_params};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route(
            "/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
}

async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Page<AppointmentDetail>>, ApiError> {
    info!("GET /appointments - query: {:?}", query);
    let (page, filters) = list_params(query)?;
    let filter = appointment_filter(&filters).map_err(|e| ApiError::invalid(e, &filters))?;
    Ok(Json(
        state.run(|clinic| clinic.list_appointments(&filter, page))?,
    ))
}

async fn create_appointment(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Outcome<Appointment>>), ApiError> {
    info!("POST /appointments");
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.create_appointment(&form))
        .map_err(|e| e.with_values(&form))?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    info!("GET /appointments/{}", id);
    Ok(Json(state.run(|clinic| clinic.get_appointment(id))?))
}

async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Outcome<Appointment>>, ApiError> {
    info!("PUT /appointments/{}", id);
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.update_appointment(id, &form))
        .map_err(|e| e.with_values(&form))?;
    Ok(Json(outcome))
}

/// Also removes the appointment's treatment and bills.
async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Outcome<CascadeSummary>>, ApiError> {
    info!("DELETE /appointments/{}", id);
    Ok(Json(state.run(|clinic| clinic.delete_appointment(id))?))
}
