//! Speech synthesis voice models

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, Path, State},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::api::form_or_default;
use crate::api::stt::{non_blank, DEFAULT_MODEL_NAME};
use crate::clients::{NewVoiceModel, VoiceModelUpdate};
use crate::{ApiError, ApiResult, AppState};

/// Language of voice models created without one
pub const DEFAULT_LANGUAGE: &str = "ja-JP";

#[derive(Debug, Serialize)]
pub struct VoiceTokenResponse {
    pub token: String,
    pub voice: String,
}

/// GET /tts/token
pub async fn token(State(state): State<AppState>) -> ApiResult<Json<VoiceTokenResponse>> {
    let token = state.backends.tts_tokens.token().await?;
    Ok(Json(VoiceTokenResponse {
        token,
        voice: state.options.tts_voice.clone(),
    }))
}

/// GET /tts
pub async fn list_models(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.backends.text_to_speech.list_customizations().await?))
}

/// Form of POST /tts
#[derive(Debug, Default, Deserialize)]
pub struct CreateVoiceForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /tts
pub async fn create_model(
    State(state): State<AppState>,
    form: Result<Form<CreateVoiceForm>, FormRejection>,
) -> ApiResult<Json<Value>> {
    let form = form_or_default(form)?;
    let request = NewVoiceModel {
        name: non_blank(form.name).unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
        language: non_blank(form.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        description: non_blank(form.description),
    };
    info!(name = %request.name, language = %request.language, "Creating voice model");

    Ok(Json(state.backends.text_to_speech.create_customization(request).await?))
}

/// GET /tts/:id
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.backends.text_to_speech.get_customization(&id).await?))
}

/// POST /tts/:id
///
/// **Request:** `{"name"?, "description"?, "words"?: [{"word", "translation"}]}`
/// **Response:** `{}`
pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let update: VoiceModelUpdate = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid voice model update: {}", e)))?;
    if update.name.is_none() && update.description.is_none() && update.words.is_empty() {
        return Err(ApiError::BadRequest("Voice model update is empty".to_string()));
    }

    state
        .backends
        .text_to_speech
        .update_customization(&id, update)
        .await?;
    info!(customization_id = %id, "Updated voice model");
    Ok(Json(json!({})))
}

/// POST /tts/:id/delete
pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.backends.text_to_speech.delete_customization(&id).await?;
    info!(customization_id = %id, "Deleted voice model");
    Ok(Json(json!({})))
}

/// Build speech synthesis routes
pub fn tts_routes() -> Router<AppState> {
    Router::new()
        .route("/tts/token", get(token))
        .route("/tts", get(list_models).post(create_model))
        .route("/tts/:id", get(get_model).post(update_model))
        .route("/tts/:id/delete", post(delete_model))
}
