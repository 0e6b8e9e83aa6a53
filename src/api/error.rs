//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::lifecycle::{LifecycleError, ValidationError};
use crate::store::StoreError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Access denied")]
    Forbidden,
    #[error("Validation failed: {0}")]
    Validation(ValidationError),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not eligible: {0}")]
    NotEligible(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You may not access this resource".to_string(),
            ),
            ApiError::Validation(err) => {
                field = Some(err.field);
                (StatusCode::BAD_REQUEST, "VALIDATION", err.message)
            }
            ApiError::InvalidStatus(value) => (
                StatusCode::BAD_REQUEST,
                "INVALID_STATUS",
                format!("Unknown status '{value}'"),
            ),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::NotEligible(detail) => (StatusCode::CONFLICT, "NOT_ELIGIBLE", detail),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                field,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(e) => ApiError::Validation(e),
            LifecycleError::InvalidStatus(value) => ApiError::InvalidStatus(value),
            LifecycleError::NotAuthorized => ApiError::Forbidden,
            LifecycleError::NotEligible(detail) => ApiError::NotEligible(detail),
            LifecycleError::NotFound { entity, id } => ApiError::NotFound(format!("{entity} {id} not found")),
            LifecycleError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        LifecycleError::from(err).into()
    }
}
