//! External collaborators
//!
//! Every remote system the service talks to sits behind a trait so handlers
//! and domain services receive their dependencies explicitly through
//! [`crate::AppState`] and tests can substitute in-process fakes.
//!
//! | Trait | Production client | Remote system |
//! |---|---|---|
//! | [`DocumentStore`] | [`cloudant::CloudantDatabase`] | Cloudant / CouchDB database |
//! | [`ClassifierService`] | [`nlc::NlcClient`] | Natural Language Classifier |
//! | [`SpeechToTextService`] | [`stt::SttClient`] | Speech to Text customizations |
//! | [`TextToSpeechService`] | [`tts::TtsClient`] | Text to Speech voice models |
//! | [`TokenIssuer`] | [`authorization::AuthorizationClient`] | streaming token authority |

pub mod authorization;
pub mod cloudant;
mod http;
pub mod nlc;
pub mod stt;
pub mod tts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub use http::build_http_client;

/// Failure of a call to an external service
///
/// `Status` keeps the raw upstream payload so it can be handed back to the
/// operator unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: u16,
        payload: Value,
    },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} sent an unreadable response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn service(&self) -> &'static str {
        match self {
            ServiceError::Status { service, .. }
            | ServiceError::Transport { service, .. }
            | ServiceError::Decode { service, .. } => service,
        }
    }

    /// Upstream HTTP status, when the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Raw error payload: the upstream body, or a synthesized object
    pub fn payload(&self) -> Value {
        match self {
            ServiceError::Status { payload, .. } => payload.clone(),
            other => json!({ "error": other.to_string() }),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

// ============================================================================
// Document store
// ============================================================================

/// One row of a view query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
}

/// Result of a view query, rows in index order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default)]
    pub rows: Vec<ViewRow>,
}

/// Outcome of a single-document or bulk write
///
/// Bulk writes report per-document failures in `error`/`reason` while the
/// request itself succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WriteResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A single database of the document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Query a precomputed view, rows sorted by the view key
    async fn view(&self, design: &str, view: &str) -> ServiceResult<ViewResponse>;

    /// Fetch a document by id; a missing document is a 404 `ServiceError`
    async fn get(&self, id: &str) -> ServiceResult<Value>;

    /// Insert (or update, when `_rev` is present) one document
    async fn insert(&self, doc: Value) -> ServiceResult<WriteResult>;

    /// Delete one document revision
    async fn destroy(&self, id: &str, rev: &str) -> ServiceResult<WriteResult>;

    /// Bulk insert/update/delete; one result per submitted document
    async fn bulk(&self, docs: Vec<Value>) -> ServiceResult<Vec<WriteResult>>;

    /// Create the database itself
    async fn create_database(&self) -> ServiceResult<()>;
}

// ============================================================================
// Text classification
// ============================================================================

/// Entry of the classifier list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSummary {
    pub classifier_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Training state reported by the classification service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStatus {
    #[serde(rename = "Training")]
    Training,
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Failed")]
    Failed,
    #[serde(rename = "Unavailable")]
    Unavailable,
    #[serde(rename = "Non Existent")]
    NonExistent,
    #[serde(other, rename = "Unknown")]
    Unknown,
}

/// Classifier detail including training status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierStatus {
    pub classifier_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: TrainingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
}

/// One ranked label of a classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedClass {
    pub class_name: String,
    pub confidence: f64,
}

/// Classification result, classes ranked by confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub classifier_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_class: Option<String>,
    #[serde(default)]
    pub classes: Vec<ClassifiedClass>,
}

/// Request to train a new classifier
#[derive(Debug, Clone)]
pub struct NewClassifier {
    pub name: String,
    pub language: String,
    /// CSV training data, `"question","label"` per line
    pub training_data: Vec<u8>,
}

#[async_trait]
pub trait ClassifierService: Send + Sync {
    async fn list(&self) -> ServiceResult<Vec<ClassifierSummary>>;

    async fn status(&self, classifier_id: &str) -> ServiceResult<ClassifierStatus>;

    /// Start training; returns the new classifier's status
    async fn create(&self, request: NewClassifier) -> ServiceResult<ClassifierStatus>;

    async fn remove(&self, classifier_id: &str) -> ServiceResult<Value>;

    async fn classify(&self, classifier_id: &str, text: &str) -> ServiceResult<Classification>;
}

// ============================================================================
// Speech customization
// ============================================================================

/// Request to create a speech recognition customization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpeechModel {
    pub name: String,
    pub base_model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Custom word for speech recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomWord {
    pub word: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sounds_like: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_as: Option<String>,
}

#[async_trait]
pub trait SpeechToTextService: Send + Sync {
    async fn list_customizations(&self) -> ServiceResult<Value>;

    async fn create_customization(&self, request: NewSpeechModel) -> ServiceResult<Value>;

    async fn get_customization(&self, customization_id: &str) -> ServiceResult<Value>;

    async fn train_customization(&self, customization_id: &str) -> ServiceResult<Value>;

    async fn delete_customization(&self, customization_id: &str) -> ServiceResult<Value>;

    async fn list_corpora(&self, customization_id: &str) -> ServiceResult<Vec<Value>>;

    async fn add_corpus(&self, customization_id: &str, name: &str, text: String)
        -> ServiceResult<Value>;

    async fn delete_corpus(&self, customization_id: &str, name: &str) -> ServiceResult<Value>;

    /// All words, alphabetical
    async fn list_words(&self, customization_id: &str) -> ServiceResult<Vec<Value>>;

    async fn add_words(&self, customization_id: &str, words: Vec<CustomWord>)
        -> ServiceResult<Value>;

    async fn delete_word(&self, customization_id: &str, word: &str) -> ServiceResult<Value>;
}

/// Request to create a voice model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVoiceModel {
    pub name: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Word → spoken translation pair of a voice model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTranslation {
    pub word: String,
    pub translation: String,
}

/// Partial update of a voice model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceModelUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordTranslation>,
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    async fn list_customizations(&self) -> ServiceResult<Value>;

    async fn create_customization(&self, request: NewVoiceModel) -> ServiceResult<Value>;

    async fn get_customization(&self, customization_id: &str) -> ServiceResult<Value>;

    async fn update_customization(
        &self,
        customization_id: &str,
        update: VoiceModelUpdate,
    ) -> ServiceResult<()>;

    async fn delete_customization(&self, customization_id: &str) -> ServiceResult<()>;
}

/// Issues short-lived tokens a browser uses to stream to a speech service
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn token(&self) -> ServiceResult<String>;
}
