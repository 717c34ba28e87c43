//! # HTTP API Errors
//!
//! One envelope for every failure: `{"error": "...", "code": 400}`, plus
//! `"field"` when a specific field is at fault.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::schema::ValidationError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Uploaded file name lacks the `.csv` suffix
    #[error("Only CSV files are allowed")]
    NotCsv(String),

    /// Multipart body had no file part
    #[error("No file provided")]
    NoFile,

    /// Upload could not be read or decoded
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Uploaded row rejected
    #[error("Row at line {line}: {source}")]
    RowRejected { line: u64, source: ValidationError },

    /// Request body is not the expected JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Single record rejected
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// One record of a bulk update rejected; nothing was applied
    #[error("Record at index {index}: {source}")]
    BatchRejected { index: usize, source: ValidationError },

    /// Unknown marketing year
    #[error("Record not found: {0}")]
    NotFound(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Mirror file failure
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotCsv(_)
            | ApiError::NoFile
            | ApiError::InvalidUpload(_)
            | ApiError::RowRejected { .. }
            | ApiError::InvalidBody(_)
            | ApiError::Validation(_)
            | ApiError::BatchRejected { .. } => StatusCode::BAD_REQUEST,

            ApiError::NotFound(_) => StatusCode::NOT_FOUND,

            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Field at fault, when the error comes from the validator
    pub fn field(&self) -> Option<&str> {
        match self {
            ApiError::Validation(source)
            | ApiError::BatchRejected { source, .. }
            | ApiError::RowRejected { source, .. } => source.field(),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(year) => ApiError::NotFound(year),
            StoreError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
            field: err.field().map(str::to_string),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
