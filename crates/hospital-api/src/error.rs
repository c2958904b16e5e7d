use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hospital_core::{ClinicError, FieldErrors, FormData};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Input the caller can correct. Echoes the submitted values back.
    #[error("Validation error: {errors}")]
    Validation { errors: FieldErrors, values: FormData },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid(errors: FieldErrors, values: &FormData) -> Self {
        ApiError::Validation {
            errors,
            values: values.clone(),
        }
    }

    /// Attach the submitted input to a validation error.
    pub fn with_values(self, values: &FormData) -> Self {
        match self {
            ApiError::Validation { errors, .. } => ApiError::invalid(errors, values),
            other => other,
        }
    }
}

impl From<ClinicError> for ApiError {
    fn from(e: ClinicError) -> Self {
        if let Some(errors) = e.field_errors() {
            return ApiError::Validation {
                errors,
                values: FormData::new(),
            };
        }
        match e {
            ClinicError::NotFound { .. } | ClinicError::InvalidPage(_) => {
                ApiError::NotFound(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { errors, values } => {
                tracing::warn!("Rejected input: {}", errors);
                let body = Json(json!({
                    "errors": errors,
                    "values": values,
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!("Error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}
