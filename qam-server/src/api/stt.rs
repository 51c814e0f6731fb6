//! Speech recognition customizations
//!
//! Thin pass-through to the speech-to-text customization API plus a
//! streaming token for the browser client.

use axum::{
    extract::{rejection::FormRejection, Multipart, Path, State},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::form_or_default;
use crate::api::upload::UploadForm;
use crate::clients::NewSpeechModel;
use crate::services::speech::{customization_detail, parse_word_upload, SpeechModelDetail};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying a corpus text file
pub const CORPUS_FIELD: &str = "corpus-txt";
/// Multipart field carrying a word list
pub const WORD_FIELD: &str = "word-json";

/// Name given to models created without one
pub const DEFAULT_MODEL_NAME: &str = "NoName";

#[derive(Debug, Serialize)]
pub struct SpeechTokenResponse {
    pub token: String,
    /// Recognition model the browser should stream against
    pub model: String,
}

/// GET /stt/token
pub async fn token(State(state): State<AppState>) -> ApiResult<Json<SpeechTokenResponse>> {
    let token = state.backends.stt_tokens.token().await?;
    Ok(Json(SpeechTokenResponse {
        token,
        model: state.options.stt_model.clone(),
    }))
}

/// GET /stt
pub async fn list_models(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.backends.speech_to_text.list_customizations().await?))
}

/// Form of POST /stt
#[derive(Debug, Default, Deserialize)]
pub struct CreateModelForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /stt
///
/// Creates a customization on the configured base model.
pub async fn create_model(
    State(state): State<AppState>,
    form: Result<Form<CreateModelForm>, FormRejection>,
) -> ApiResult<Json<Value>> {
    let form = form_or_default(form)?;
    let request = NewSpeechModel {
        name: non_blank(form.name).unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
        base_model_name: state.options.stt_model.clone(),
        description: non_blank(form.description),
    };
    info!(name = %request.name, base_model = %request.base_model_name, "Creating speech model");

    Ok(Json(state.backends.speech_to_text.create_customization(request).await?))
}

/// GET /stt/:id
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SpeechModelDetail>> {
    let detail = customization_detail(state.backends.speech_to_text.as_ref(), &id).await?;
    Ok(Json(detail))
}

/// POST /stt/:id/train
pub async fn train_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let value = state.backends.speech_to_text.train_customization(&id).await?;
    info!(customization_id = %id, "Started speech model training");
    Ok(Json(value))
}

/// POST /stt/:id/delete
pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let value = state.backends.speech_to_text.delete_customization(&id).await?;
    info!(customization_id = %id, "Deleted speech model");
    Ok(Json(value))
}

/// POST /stt/:id/corpus
///
/// The corpus is named after the uploaded file without its extension.
pub async fn add_corpus(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let form = UploadForm::read(multipart).await?;
    let part = form.file(CORPUS_FIELD)?;
    let name = part
        .stem()
        .ok_or_else(|| ApiError::BadRequest("Corpus file has no name".to_string()))?;
    let text = part.text(CORPUS_FIELD)?;

    info!(customization_id = %id, corpus = %name, bytes = text.len(), "Adding corpus");
    let value = state
        .backends
        .speech_to_text
        .add_corpus(&id, &name, text)
        .await?;
    Ok(Json(value))
}

/// POST /stt/:id/corpus/:name/delete
pub async fn delete_corpus(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let value = state.backends.speech_to_text.delete_corpus(&id, &name).await?;
    info!(customization_id = %id, corpus = %name, "Deleted corpus");
    Ok(Json(value))
}

/// POST /stt/:id/word
pub async fn add_words(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let form = UploadForm::read(multipart).await?;
    let words = parse_word_upload(&form.file(WORD_FIELD)?.data)?;

    info!(customization_id = %id, words = words.len(), "Adding words");
    let value = state.backends.speech_to_text.add_words(&id, words).await?;
    Ok(Json(value))
}

/// POST /stt/:id/word/:word/delete
pub async fn delete_word(
    State(state): State<AppState>,
    Path((id, word)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let value = state.backends.speech_to_text.delete_word(&id, &word).await?;
    info!(customization_id = %id, word = %word, "Deleted word");
    Ok(Json(value))
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build speech recognition routes
pub fn stt_routes() -> Router<AppState> {
    Router::new()
        .route("/stt/token", get(token))
        .route("/stt", get(list_models).post(create_model))
        .route("/stt/:id", get(get_model))
        .route("/stt/:id/train", post(train_model))
        .route("/stt/:id/delete", post(delete_model))
        .route("/stt/:id/corpus", post(add_corpus))
        .route("/stt/:id/corpus/:name/delete", post(delete_corpus))
        .route("/stt/:id/word", post(add_words))
        .route("/stt/:id/word/:word/delete", post(delete_word))
}
