//! qam-server library interface
//!
//! Maintenance backend for a Q&A chat knowledge base: content documents in
//! a Cloudant database, a text classifier trained from them, and speech
//! customizations fed from the same content.

pub mod api;
pub mod clients;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use clients::authorization::AuthorizationClient;
use clients::cloudant::CloudantClient;
use clients::nlc::NlcClient;
use clients::stt::SttClient;
use clients::tts::TtsClient;
use clients::{
    ClassifierService, DocumentStore, ServiceResult, SpeechToTextService, TextToSpeechService,
    TokenIssuer,
};
use qam_common::config::TomlConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// External collaborators, one handle per remote system
#[derive(Clone)]
pub struct Backends {
    /// Q&A content database
    pub content: Arc<dyn DocumentStore>,
    /// Chat feedback database
    pub feedback: Arc<dyn DocumentStore>,
    pub classifier: Arc<dyn ClassifierService>,
    pub speech_to_text: Arc<dyn SpeechToTextService>,
    pub text_to_speech: Arc<dyn TextToSpeechService>,
    /// Streaming tokens for the speech recognition service
    pub stt_tokens: Arc<dyn TokenIssuer>,
    /// Streaming tokens for the speech synthesis service
    pub tts_tokens: Arc<dyn TokenIssuer>,
}

impl Backends {
    /// Production clients built from validated configuration
    pub fn from_config(config: &TomlConfig) -> ServiceResult<Self> {
        let http = clients::build_http_client(Duration::from_secs(
            config.http.request_timeout_secs,
        ))
        .map_err(|e| clients::ServiceError::Transport {
            service: "HTTP client",
            message: e.to_string(),
        })?;

        let cloudant = CloudantClient::new(http.clone(), &config.cloudant.url)?;
        let stt = &config.speech_to_text.credentials;
        let tts = &config.text_to_speech.credentials;

        Ok(Self {
            content: Arc::new(cloudant.database(config.cloudant.content_database.clone())),
            feedback: Arc::new(cloudant.database(config.cloudant.feedback_database.clone())),
            classifier: Arc::new(NlcClient::new(http.clone(), &config.classifier.credentials)?),
            speech_to_text: Arc::new(SttClient::new(http.clone(), stt)?),
            text_to_speech: Arc::new(TtsClient::new(http.clone(), tts)?),
            stt_tokens: Arc::new(AuthorizationClient::new(
                http.clone(),
                &config.authorization.url,
                stt,
            )?),
            tts_tokens: Arc::new(AuthorizationClient::new(http, &config.authorization.url, tts)?),
        })
    }
}

/// Request-independent settings handlers need
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Base model for new speech recognition customizations
    pub stt_model: String,
    /// Voice reported alongside synthesis tokens
    pub tts_voice: String,
    /// Language of newly trained classifiers
    pub classifier_language: String,
    /// Maximum concurrent lookups per fan-out
    pub fan_out_limit: usize,
    pub max_upload_bytes: usize,
    pub allow_any_origin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

impl ServerOptions {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            stt_model: config.speech_to_text.model.clone(),
            tts_voice: config.text_to_speech.voice.clone(),
            classifier_language: config.classifier.language.clone(),
            fan_out_limit: config.http.fan_out_limit,
            max_upload_bytes: config.http.max_upload_bytes,
            allow_any_origin: config.http.allow_any_origin,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub backends: Backends,
    pub options: Arc<ServerOptions>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(backends: Backends, options: ServerOptions) -> Self {
        Self {
            backends,
            options: Arc::new(options),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.options.max_upload_bytes;
    let allow_any_origin = state.options.allow_any_origin;

    let router = Router::new()
        .merge(api::health_routes())
        .merge(api::content_routes())
        .merge(api::nlc_routes())
        .merge(api::stt_routes())
        .merge(api::tts_routes())
        .merge(api::feedback_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if allow_any_origin {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
