//! Classifier management and classification
//!
//! | Method | Path | Behaviour |
//! |---|---|---|
//! | GET | /nlc | classifiers with training status |
//! | POST | /nlc | train a classifier from an uploaded `training-csv` |
//! | POST | /nlc/:id/delete | delete a classifier |
//! | GET | /nlc/:id/classify | classify `text`, resolve an answer per class |

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use qam_common::ReferenceTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::api::upload::UploadForm;
use crate::clients::{ClassifierStatus, NewClassifier};
use crate::services::answer::{classify_with_answers, ClassifyResult};
use crate::services::classifiers::{check_training_csv, list_with_status};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the training data
pub const TRAINING_FIELD: &str = "training-csv";

/// GET /nlc
pub async fn list_classifiers(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ClassifierStatus>>> {
    let classifiers = list_with_status(
        state.backends.classifier.as_ref(),
        state.options.fan_out_limit,
    )
    .await?;
    Ok(Json(classifiers))
}

/// POST /nlc
///
/// The classifier is named after the uploaded file without its extension.
pub async fn create_classifier(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ClassifierStatus>> {
    let form = UploadForm::read(multipart).await?;
    let part = form.file(TRAINING_FIELD)?;
    let name = part
        .stem()
        .ok_or_else(|| ApiError::BadRequest("Training file has no name".to_string()))?;
    let rows = check_training_csv(&part.data)?;

    info!(name = %name, rows, "Training new classifier");
    let status = state
        .backends
        .classifier
        .create(NewClassifier {
            name,
            language: state.options.classifier_language.clone(),
            training_data: part.data.to_vec(),
        })
        .await?;

    Ok(Json(status))
}

/// POST /nlc/:id/delete
pub async fn delete_classifier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let value = state.backends.classifier.remove(&id).await?;
    info!(classifier_id = %id, "Deleted classifier");
    Ok(Json(value))
}

/// Query of GET /nlc/:id/classify
#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    #[serde(default)]
    pub text: String,
    /// Reference time `YYYY年M月D日 H時m分s秒`; server local time when absent
    #[serde(default)]
    pub now: Option<String>,
}

/// GET /nlc/:id/classify?text=...&now=...
pub async fn classify(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ClassifyQuery>,
) -> ApiResult<Json<ClassifyResult>> {
    if query.text.trim().is_empty() {
        return Err(ApiError::BadRequest("\"text\" is required".to_string()));
    }
    let now = match query.now.as_deref() {
        Some(raw) if !raw.trim().is_empty() => ReferenceTime::parse(raw)?,
        _ => ReferenceTime::from(Local::now().naive_local()),
    };

    let result = classify_with_answers(
        state.backends.classifier.as_ref(),
        state.backends.content.as_ref(),
        &id,
        &query.text,
        &now,
        state.options.fan_out_limit,
    )
    .await?;

    Ok(Json(result))
}

/// Build classifier routes
pub fn nlc_routes() -> Router<AppState> {
    Router::new()
        .route("/nlc", get(list_classifiers).post(create_classifier))
        .route("/nlc/:id/delete", post(delete_classifier))
        .route("/nlc/:id/classify", get(classify))
}
