//! Apple Records HTTP Routes
//!
//! Endpoints for CSV upload, per-year read/update and bulk update, nested
//! under `/api/v1/apples`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::schema::{validate, validate_update, AppleRecord, ValidationError};
use crate::storage::codec;
use crate::store::RecordStore;

use super::config::ImportMode;
use super::errors::{ApiError, ApiResult};

// ==================
// Shared State
// ==================

/// State shared across apple handlers
pub struct AppleState {
    pub store: RecordStore,
    pub import_mode: ImportMode,
}

impl AppleState {
    pub fn new(store: RecordStore, import_mode: ImportMode) -> Self {
        Self { store, import_mode }
    }
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub records: usize,
}

// ==================
// Routes
// ==================

/// Create apple record routes
pub fn apple_routes(state: Arc<AppleState>) -> Router {
    Router::new()
        .route("/upload", post(upload_handler))
        .route(
            "/records",
            get(list_records_handler).put(bulk_update_handler),
        )
        .route(
            "/records/:marketing_year",
            get(get_record_handler).put(update_record_handler),
        )
        .with_state(state)
}

/// Create the health check route
pub fn health_routes(state: Arc<AppleState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn upload_handler(
    State(state): State<Arc<AppleState>>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(e.body_text()))?
    {
        // Plain form fields carry no file name.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        if !file_name.ends_with(".csv") {
            return Err(ApiError::NotCsv(file_name));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidUpload(e.body_text()))?;
        let text = std::str::from_utf8(&data)
            .map_err(|e| ApiError::InvalidUpload(format!("file is not valid UTF-8: {}", e)))?;

        let records = parse_upload(text, state.import_mode)?;
        let count = state.store.put_all(records)?;

        info!(file = %file_name, records = count, mode = ?state.import_mode, "csv uploaded");

        return Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new("File uploaded successfully")),
        ));
    }

    Err(ApiError::NoFile)
}

async fn list_records_handler(State(state): State<Arc<AppleState>>) -> Json<Vec<AppleRecord>> {
    let records = state.store.list();
    debug!(records = records.len(), "listing records");
    Json(records)
}

async fn get_record_handler(
    State(state): State<Arc<AppleState>>,
    Path(marketing_year): Path<String>,
) -> ApiResult<Json<AppleRecord>> {
    state
        .store
        .get(&marketing_year)
        .map(Json)
        .ok_or(ApiError::NotFound(marketing_year))
}

async fn update_record_handler(
    State(state): State<Arc<AppleState>>,
    Path(marketing_year): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AppleRecord>> {
    // Unknown years are 404 whatever the body holds.
    if state.store.get(&marketing_year).is_none() {
        return Err(ApiError::NotFound(marketing_year));
    }

    let Json(candidate) = body?;
    let record = validate_update(&marketing_year, &candidate)?;
    let stored = state.store.replace_existing(record)?;

    info!(marketing_year = %stored.marketing_year, "record updated");
    Ok(Json(stored))
}

async fn bulk_update_handler(
    State(state): State<Arc<AppleState>>,
    body: Result<Json<Vec<Value>>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(candidates) = body?;

    // Validate everything before touching the store.
    let records = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            validate(candidate).map_err(|source| ApiError::BatchRejected { index, source })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let count = state.store.put_all(records)?;
    info!(records = count, "bulk update applied");

    Ok(Json(MessageResponse::new("Records updated successfully")))
}

async fn health_handler(State(state): State<Arc<AppleState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        records: state.store.len(),
    })
}

// ==================
// Helper Functions
// ==================

/// Decodes an uploaded CSV into records according to the import mode.
///
/// Any bad row rejects the whole upload.
fn parse_upload(text: &str, mode: ImportMode) -> ApiResult<Vec<AppleRecord>> {
    let table = codec::decode(text).map_err(|e| ApiError::InvalidUpload(e.to_string()))?;

    table
        .rows()
        .iter()
        .map(|row| match mode {
            ImportMode::Validated => validate(&row.to_nested()).map_err(|source| {
                ApiError::RowRejected {
                    line: row.line(),
                    source,
                }
            }),
            ImportMode::Trusted => {
                if row.marketing_year().is_none() {
                    return Err(ApiError::RowRejected {
                        line: row.line(),
                        source: ValidationError::marketing_year_required(),
                    });
                }
                row.to_record()
                    .map_err(|e| ApiError::InvalidUpload(e.to_string()))
            }
        })
        .collect()
}
