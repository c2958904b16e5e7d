use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use hospital_core::validation::bill_filter;
use hospital_core::{Bill, BillDetail, CascadeSummary, FormData, Outcome, Page};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::{form_data, list_params};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills).post(create_bill))
        .route("/{id}", get(get_bill).put(update_bill).delete(delete_bill))
        .route("/{id}/pay", post(mark_bill_paid))
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub payment_method: Option<String>,
}

async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Page<BillDetail>>, ApiError> {
    info!("GET /bills - query: {:?}", query);
    let (page, filters) = list_params(query)?;
    let filter = bill_filter(&filters).map_err(|e| ApiError::invalid(e, &filters))?;
    Ok(Json(state.run(|clinic| clinic.list_bills(&filter, page))?))
}

async fn create_bill(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Outcome<Bill>>), ApiError> {
    info!("POST /bills");
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.create_bill(&form))
        .map_err(|e| e.with_values(&form))?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BillDetail>, ApiError> {
    info!("GET /bills/{}", id);
    Ok(Json(state.run(|clinic| clinic.get_bill(id))?))
}

async fn update_bill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Outcome<Bill>>, ApiError> {
    info!("PUT /bills/{}", id);
    let form = form_data(body);
    let outcome = state
        .run(|clinic| clinic.update_bill(id, &form))
        .map_err(|e| e.with_values(&form))?;
    Ok(Json(outcome))
}

async fn delete_bill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Outcome<CascadeSummary>>, ApiError> {
    info!("DELETE /bills/{}", id);
    Ok(Json(state.run(|clinic| clinic.delete_bill(id))?))
}

/// Settle a bill. The body is optional; without a method the bill is paid in cash.
async fn mark_bill_paid(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<PaymentRequest>>,
) -> Result<Json<Outcome<Bill>>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    info!("POST /bills/{}/pay - method: {:?}", id, request.payment_method);
    let method = request.payment_method.as_deref();
    let outcome = state
        .run(|clinic| clinic.mark_bill_paid(id, method))
        .map_err(|e| {
            let values: FormData = method
                .map(|m| FormData::from([("payment_method".to_string(), m.to_string())]))
                .unwrap_or_default();
            e.with_values(&values)
        })?;
    Ok(Json(outcome))
}
