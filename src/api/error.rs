//--------------------------------------------------------------------------------------------------
// ENUMS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Key Methods         |
// |-----------------|--------------------------------------------------|---------------------|
// | ApiError        | Error types for the API                          | from                |
//--------------------------------------------------------------------------------------------------
// Maps the order-submission error taxonomy onto HTTP status codes: validation failures
// to 422 with the field error body, everything else (`DuplicateId`, any other
// `StoreError`) to 500 — a duplicate id is a caller bug with no synchronous exception
// to the submitter beyond "internal failure".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::dto::FieldError;
use crate::domain::models::order::OrderValidationError;
use crate::facade::SubmissionError;
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed: {0:?}")]
    Validation(FieldError),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err)
    }
}

impl From<OrderValidationError> for ApiError {
    fn from(err: OrderValidationError) -> Self {
        let field = match err {
            OrderValidationError::MissingLimitPrice | OrderValidationError::UnexpectedLimitPrice | OrderValidationError::NonPositiveLimitPrice => "limit_price",
            OrderValidationError::WrongInstrumentLength(_) => "instrument",
            OrderValidationError::NonPositiveQuantity => "quantity",
        };
        Self::Validation(FieldError { field, message: err.to_string() })
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(e) => e.into(),
            SubmissionError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // DuplicateId is a caller bug: the facade always generates a fresh uuid, so a
        // collision here means something upstream reused an id, not a user mistake
        // worth a 4xx. Every store failure is logged by the caller before this
        // conversion runs (see routes.rs).
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(field_error) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "field": field_error.field, "message": field_error.message })),
            )
                .into_response(),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": { "message": message, "code": 404 } })),
            )
                .into_response(),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": message, "code": 500 } })),
            )
                .into_response(),
        }
    }
}
