//! Content export and import
//!
//! - GET /export-content: every document as pretty-printed `{"docs": [...]}`
//! - GET /export-training-csv: classifier training data
//! - GET /export-corpus: speech recognition corpus
//! - POST /import-content: replace the collection with an uploaded dump

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use crate::api::upload::UploadForm;
use crate::services::{export, reload};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the content dump
pub const CONTENT_FIELD: &str = "content-json";

const JSON_UTF8: &str = "application/json; charset=utf-8";
const CSV_UTF8: &str = "text/csv; charset=utf-8";
const TEXT_UTF8: &str = "text/plain; charset=utf-8";

/// GET /export-content
pub async fn export_content(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let docs = export::list_all(state.backends.content.as_ref()).await?;
    let body = serde_json::to_string_pretty(&json!({ "docs": docs }))
        .map_err(|e| ApiError::Internal(format!("Failed to serialize export: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, JSON_UTF8)], body))
}

/// GET /export-training-csv
pub async fn export_training_csv(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let docs = export::list_content(state.backends.content.as_ref()).await?;
    Ok(([(header::CONTENT_TYPE, CSV_UTF8)], export::to_csv(&docs)))
}

/// GET /export-corpus
pub async fn export_corpus(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let docs = export::list_content(state.backends.content.as_ref()).await?;
    Ok(([(header::CONTENT_TYPE, TEXT_UTF8)], export::to_corpus(&docs)))
}

/// POST /import-content
///
/// **Request:** multipart with a `content-json` file in the
/// `/export-content` format
/// **Response:** `{"deleted": n, "inserted": [write results]}`
///
/// **Errors:**
/// - 400 Bad Request: missing file, malformed JSON, bad `docs` shape
/// - 500 Internal Server Error: listing, deletion or insert failed
pub async fn import_content(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<reload::ReplaceReport>> {
    let form = UploadForm::read(multipart).await?;
    let part = form.file(CONTENT_FIELD)?;

    let payload: Value = serde_json::from_slice(&part.data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid content JSON: {}", e)))?;
    let docs = reload::parse_import(payload)?;
    info!(documents = docs.len(), "Replacing content collection");

    let report = reload::replace_all(state.backends.content.as_ref(), docs).await?;
    Ok(Json(report))
}

/// Build content routes
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/export-content", get(export_content))
        .route("/export-training-csv", get(export_training_csv))
        .route("/export-corpus", get(export_corpus))
        .route("/import-content", post(import_content))
}
