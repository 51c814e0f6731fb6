//! Shared fixtures for qam-server integration tests
//!
//! In-memory stand-ins for every external collaborator plus request
//! builders for the router.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use qam_server::clients::{
    Classification, ClassifiedClass, ClassifierService, ClassifierStatus, ClassifierSummary,
    CustomWord, DocumentStore, NewClassifier, NewSpeechModel, NewVoiceModel, ServiceError,
    ServiceResult, SpeechToTextService, TextToSpeechService, TokenIssuer, TrainingStatus,
    ViewResponse, ViewRow, VoiceModelUpdate, WriteResult,
};
use qam_server::{build_router, AppState, Backends, ServerOptions};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// Document store
// =============================================================================

/// Document store keeping documents in id order
///
/// The view lists every document except design documents and the settings
/// document, keyed by id.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Value>>,
    next_rev: AtomicUsize,
    database_exists: Mutex<bool>,
    /// Status returned by every view query
    pub fail_view: Mutex<Option<u16>>,
    /// Status returned by every single-document read
    pub fail_get: Mutex<Option<u16>>,
    /// Ids whose bulk deletion is rejected with a conflict
    pub reject_delete: Mutex<Vec<String>>,
    /// Ids whose bulk insertion is rejected as forbidden
    pub reject_insert: Mutex<Vec<String>>,
    /// Every bulk batch submitted, in order
    pub bulk_batches: Mutex<Vec<Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store a document, assigning a fresh revision
    pub fn put(&self, mut doc: Value) {
        let id = doc["_id"].as_str().unwrap_or_default().to_string();
        doc["_rev"] = json!(self.fresh_rev());
        self.docs.lock().unwrap().insert(id, doc);
    }

    pub fn doc(&self, id: &str) -> Option<Value> {
        self.docs.lock().unwrap().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.docs.lock().unwrap().keys().cloned().collect()
    }

    pub fn mark_database_created(&self) {
        *self.database_exists.lock().unwrap() = true;
    }

    fn fresh_rev(&self) -> String {
        format!("{}-fake", self.next_rev.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn status(status: u16, error: &str, reason: &str) -> ServiceError {
        ServiceError::Status {
            service: "Cloudant",
            status,
            payload: json!({ "error": error, "reason": reason }),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn view(&self, _design: &str, _view: &str) -> ServiceResult<ViewResponse> {
        if let Some(status) = *self.fail_view.lock().unwrap() {
            return Err(Self::status(status, "view_failed", "injected"));
        }
        let docs = self.docs.lock().unwrap();
        let rows: Vec<ViewRow> = docs
            .iter()
            .filter(|(id, _)| !id.starts_with("_design/") && id.as_str() != "app_settings")
            .map(|(id, doc)| ViewRow {
                id: Some(id.clone()),
                key: json!(id),
                value: doc.clone(),
            })
            .collect();
        Ok(ViewResponse {
            total_rows: Some(rows.len() as u64),
            offset: Some(0),
            rows,
        })
    }

    async fn get(&self, id: &str) -> ServiceResult<Value> {
        if let Some(status) = *self.fail_get.lock().unwrap() {
            return Err(Self::status(status, "get_failed", "injected"));
        }
        self.doc(id)
            .ok_or_else(|| Self::status(404, "not_found", "missing"))
    }

    async fn insert(&self, doc: Value) -> ServiceResult<WriteResult> {
        let id = doc["_id"].as_str().unwrap_or_default().to_string();
        if self.doc(&id).is_some() {
            return Err(Self::status(409, "conflict", "Document update conflict."));
        }
        self.put(doc);
        Ok(WriteResult {
            ok: Some(true),
            rev: self.doc(&id).and_then(|d| d["_rev"].as_str().map(str::to_string)),
            id,
            error: None,
            reason: None,
        })
    }

    async fn destroy(&self, id: &str, rev: &str) -> ServiceResult<WriteResult> {
        let mut docs = self.docs.lock().unwrap();
        match docs.get(id) {
            None => Err(Self::status(404, "not_found", "deleted")),
            Some(doc) if doc["_rev"] != json!(rev) => {
                Err(Self::status(409, "conflict", "Document update conflict."))
            }
            Some(_) => {
                docs.remove(id);
                Ok(WriteResult {
                    ok: Some(true),
                    id: id.to_string(),
                    rev: Some(rev.to_string()),
                    error: None,
                    reason: None,
                })
            }
        }
    }

    async fn bulk(&self, docs: Vec<Value>) -> ServiceResult<Vec<WriteResult>> {
        self.bulk_batches.lock().unwrap().push(docs.clone());
        let rejected = self.reject_delete.lock().unwrap().clone();
        let forbidden = self.reject_insert.lock().unwrap().clone();

        let mut results = Vec::new();
        for doc in docs {
            let id = doc["_id"].as_str().unwrap_or_default().to_string();
            if doc["_deleted"] == json!(true) {
                if rejected.contains(&id) {
                    results.push(WriteResult {
                        ok: None,
                        id,
                        rev: None,
                        error: Some("conflict".to_string()),
                        reason: Some("Document update conflict.".to_string()),
                    });
                    continue;
                }
                self.docs.lock().unwrap().remove(&id);
                results.push(WriteResult {
                    ok: Some(true),
                    id,
                    rev: None,
                    error: None,
                    reason: None,
                });
            } else if forbidden.contains(&id) {
                results.push(WriteResult {
                    ok: None,
                    id,
                    rev: None,
                    error: Some("forbidden".to_string()),
                    reason: Some("Write rejected.".to_string()),
                });
            } else {
                self.put(doc);
                let rev = self.doc(&id).and_then(|d| d["_rev"].as_str().map(str::to_string));
                results.push(WriteResult {
                    ok: Some(true),
                    id,
                    rev,
                    error: None,
                    reason: None,
                });
            }
        }
        Ok(results)
    }

    async fn create_database(&self) -> ServiceResult<()> {
        let mut exists = self.database_exists.lock().unwrap();
        if *exists {
            return Err(Self::status(412, "file_exists", "The database could not be created."));
        }
        *exists = true;
        Ok(())
    }
}

/// Content document as stored
pub fn content(id: &str, questions: &[&str], message: &str) -> Value {
    json!({ "_id": id, "message": message, "questions": questions })
}

// =============================================================================
// Classifier
// =============================================================================

#[derive(Default)]
pub struct FakeClassifier {
    pub classifiers: Mutex<Vec<ClassifierStatus>>,
    pub classes: Mutex<Vec<ClassifiedClass>>,
    /// Classifier whose status lookup fails
    pub fail_status_for: Mutex<Option<String>>,
    pub created: Mutex<Vec<NewClassifier>>,
    pub removed: Mutex<Vec<String>>,
}

impl FakeClassifier {
    pub fn add(&self, id: &str, status: TrainingStatus) {
        self.classifiers.lock().unwrap().push(ClassifierStatus {
            classifier_id: id.to_string(),
            name: Some(format!("{}-name", id)),
            language: Some("ja".to_string()),
            created: None,
            url: None,
            status,
            status_description: None,
        });
    }

    pub fn rank(&self, classes: &[(&str, f64)]) {
        *self.classes.lock().unwrap() = classes
            .iter()
            .map(|(name, confidence)| ClassifiedClass {
                class_name: name.to_string(),
                confidence: *confidence,
            })
            .collect();
    }
}

#[async_trait]
impl ClassifierService for FakeClassifier {
    async fn list(&self) -> ServiceResult<Vec<ClassifierSummary>> {
        Ok(self
            .classifiers
            .lock()
            .unwrap()
            .iter()
            .map(|c| ClassifierSummary {
                classifier_id: c.classifier_id.clone(),
                name: c.name.clone(),
                language: c.language.clone(),
                created: None,
                url: None,
            })
            .collect())
    }

    async fn status(&self, classifier_id: &str) -> ServiceResult<ClassifierStatus> {
        if self.fail_status_for.lock().unwrap().as_deref() == Some(classifier_id) {
            return Err(ServiceError::Status {
                service: "Natural Language Classifier",
                status: 503,
                payload: json!({ "code": 503, "error": "Service Unavailable" }),
            });
        }
        self.classifiers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.classifier_id == classifier_id)
            .cloned()
            .ok_or_else(|| ServiceError::Status {
                service: "Natural Language Classifier",
                status: 404,
                payload: json!({ "code": 404, "error": "Not found" }),
            })
    }

    async fn create(&self, request: NewClassifier) -> ServiceResult<ClassifierStatus> {
        let status = ClassifierStatus {
            classifier_id: "new-classifier".to_string(),
            name: Some(request.name.clone()),
            language: Some(request.language.clone()),
            created: None,
            url: None,
            status: TrainingStatus::Training,
            status_description: None,
        };
        self.created.lock().unwrap().push(request);
        Ok(status)
    }

    async fn remove(&self, classifier_id: &str) -> ServiceResult<Value> {
        self.removed.lock().unwrap().push(classifier_id.to_string());
        Ok(json!({}))
    }

    async fn classify(&self, classifier_id: &str, text: &str) -> ServiceResult<Classification> {
        let classes = self.classes.lock().unwrap().clone();
        Ok(Classification {
            classifier_id: classifier_id.to_string(),
            url: None,
            text: text.to_string(),
            top_class: classes.first().map(|c| c.class_name.clone()),
            classes,
        })
    }
}

// =============================================================================
// Speech
// =============================================================================

/// Records every call as `"<operation> <args>"`
#[derive(Default)]
pub struct FakeSpeech {
    pub calls: Mutex<Vec<String>>,
    pub corpora: Mutex<Vec<(String, String)>>,
    pub words: Mutex<Vec<CustomWord>>,
    pub created: Mutex<Vec<NewSpeechModel>>,
    /// Fail word listing with a 500
    pub fail_words: Mutex<bool>,
}

impl FakeSpeech {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SpeechToTextService for FakeSpeech {
    async fn list_customizations(&self) -> ServiceResult<Value> {
        Ok(json!({ "customizations": [{ "customization_id": "c1", "name": "faq" }] }))
    }

    async fn create_customization(&self, request: NewSpeechModel) -> ServiceResult<Value> {
        self.created.lock().unwrap().push(request);
        Ok(json!({ "customization_id": "c-new" }))
    }

    async fn get_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        Ok(json!({ "customization_id": customization_id, "status": "ready" }))
    }

    async fn train_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        self.record(format!("train {}", customization_id));
        Ok(json!({}))
    }

    async fn delete_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        self.record(format!("delete {}", customization_id));
        Ok(json!({}))
    }

    async fn list_corpora(&self, _customization_id: &str) -> ServiceResult<Vec<Value>> {
        Ok(self
            .corpora
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| json!({ "name": name, "status": "analyzed" }))
            .collect())
    }

    async fn add_corpus(
        &self,
        customization_id: &str,
        name: &str,
        text: String,
    ) -> ServiceResult<Value> {
        self.record(format!("add_corpus {} {}", customization_id, name));
        self.corpora.lock().unwrap().push((name.to_string(), text));
        Ok(json!({}))
    }

    async fn delete_corpus(&self, customization_id: &str, name: &str) -> ServiceResult<Value> {
        self.record(format!("delete_corpus {} {}", customization_id, name));
        Ok(json!({}))
    }

    async fn list_words(&self, _customization_id: &str) -> ServiceResult<Vec<Value>> {
        if *self.fail_words.lock().unwrap() {
            return Err(ServiceError::Status {
                service: "Speech to Text",
                status: 500,
                payload: json!({ "code": 500, "error": "words unavailable" }),
            });
        }
        Ok(self
            .words
            .lock()
            .unwrap()
            .iter()
            .map(|w| json!({ "word": w.word, "sounds_like": w.sounds_like }))
            .collect())
    }

    async fn add_words(
        &self,
        customization_id: &str,
        words: Vec<CustomWord>,
    ) -> ServiceResult<Value> {
        self.record(format!("add_words {} {}", customization_id, words.len()));
        self.words.lock().unwrap().extend(words);
        Ok(json!({}))
    }

    async fn delete_word(&self, customization_id: &str, word: &str) -> ServiceResult<Value> {
        self.record(format!("delete_word {} {}", customization_id, word));
        Ok(json!({}))
    }
}

#[derive(Default)]
pub struct FakeVoice {
    pub created: Mutex<Vec<NewVoiceModel>>,
    pub updates: Mutex<Vec<(String, VoiceModelUpdate)>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl TextToSpeechService for FakeVoice {
    async fn list_customizations(&self) -> ServiceResult<Value> {
        Ok(json!({ "customizations": [] }))
    }

    async fn create_customization(&self, request: NewVoiceModel) -> ServiceResult<Value> {
        self.created.lock().unwrap().push(request);
        Ok(json!({ "customization_id": "v-new" }))
    }

    async fn get_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        Ok(json!({ "customization_id": customization_id, "words": [] }))
    }

    async fn update_customization(
        &self,
        customization_id: &str,
        update: VoiceModelUpdate,
    ) -> ServiceResult<()> {
        self.updates
            .lock()
            .unwrap()
            .push((customization_id.to_string(), update));
        Ok(())
    }

    async fn delete_customization(&self, customization_id: &str) -> ServiceResult<()> {
        self.deleted.lock().unwrap().push(customization_id.to_string());
        Ok(())
    }
}

pub struct FixedToken(pub &'static str);

#[async_trait]
impl TokenIssuer for FixedToken {
    async fn token(&self) -> ServiceResult<String> {
        Ok(self.0.to_string())
    }
}

// =============================================================================
// Test application
// =============================================================================

pub struct TestApp {
    pub content: Arc<MemoryStore>,
    pub feedback: Arc<MemoryStore>,
    pub classifier: Arc<FakeClassifier>,
    pub speech: Arc<FakeSpeech>,
    pub voice: Arc<FakeVoice>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            content: MemoryStore::new(),
            feedback: MemoryStore::new(),
            classifier: Arc::new(FakeClassifier::default()),
            speech: Arc::new(FakeSpeech::default()),
            voice: Arc::new(FakeVoice::default()),
        }
    }

    /// Fresh router over the shared fakes
    pub fn router(&self) -> Router {
        let backends = Backends {
            content: self.content.clone(),
            feedback: self.feedback.clone(),
            classifier: self.classifier.clone(),
            speech_to_text: self.speech.clone(),
            text_to_speech: self.voice.clone(),
            stt_tokens: Arc::new(FixedToken("stt-token")),
            tts_tokens: Arc::new(FixedToken("tts-token")),
        };
        build_router(AppState::new(backends, ServerOptions::default()))
    }
}

// =============================================================================
// Requests
// =============================================================================

const BOUNDARY: &str = "qam-test-boundary";

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

/// POST without a body or content type
pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart request carrying one file part
pub fn post_file(uri: &str, field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Percent-encode a query parameter value
pub fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

pub async fn body_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Body should be UTF-8")
}

pub async fn body_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}
