use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::PredictError;
use crate::screening::ScreeningError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Catalog(PredictError),
    Propagation(String),
    Internal(String),
}

impl From<ScreeningError> for ApiError {
    fn from(e: ScreeningError) -> Self {
        match e {
            ScreeningError::UnknownSatellite(name) => ApiError::NotFound(name),
            ScreeningError::InvalidGridConfiguration(_) | ScreeningError::InvalidThreshold(_) => {
                ApiError::Validation(e.to_string())
            }
            ScreeningError::Provider { .. } => ApiError::Propagation(e.to_string()),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        ApiError::Catalog(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::NotFound(name) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message("satellite_not_found", &name)),
            )
                .into_response(),
            ApiError::Catalog(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_message("catalog_error", &e.to_string())),
            )
                .into_response(),
            ApiError::Propagation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::with_message("propagation_failed", &msg)),
            )
                .into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_message("internal_error", &msg)),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
