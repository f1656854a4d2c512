//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ValidationErrors;
use domain::{DomainError, OrderError};
use serde_json::{Value, json};
use store::StoreError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// API-level error type that maps to HTTP responses.
///
/// Every variant renders as `{ "success": false, "error": ..., "details"? }`.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed input that has no field breakdown, such as a bad path id.
    BadRequest(String),
    /// Field-level validation failures.
    Validation(ValidationErrors),
    /// Resource not found.
    NotFound(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Store failure outside the order engine.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                errors.to_string(),
                serde_json::to_value(&errors).ok(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Store(err) => internal(&err),
        };

        let mut body = json!({ "success": false, "error": message });
        if let Some(details) = details {
            body["details"] = details;
        }
        (status, axum::Json(body)).into_response()
    }
}

fn internal(err: &dyn std::error::Error) -> (StatusCode, String, Option<Value>) {
    tracing::error!(error = %err, "internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_MESSAGE.to_string(),
        None,
    )
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String, Option<Value>) {
    match &err {
        DomainError::Order(order_err) => match order_err {
            OrderError::NotFound(_) => (StatusCode::NOT_FOUND, "Order not found".to_string(), None),
            OrderError::MissingCatalogItems { missing } => (
                StatusCode::BAD_REQUEST,
                err.to_string(),
                Some(json!({ "missingItems": missing })),
            ),
            OrderError::InvalidTransition { .. } => {
                (StatusCode::BAD_REQUEST, err.to_string(), None)
            }
            OrderError::ConcurrentUpdate { .. } => (StatusCode::CONFLICT, err.to_string(), None),
        },
        DomainError::Store(store_err) => internal(store_err),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}
