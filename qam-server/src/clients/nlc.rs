//! Natural Language Classifier client
//!
//! # API Reference
//! - `GET    /v1/classifiers` - list
//! - `GET    /v1/classifiers/{id}` - status
//! - `POST   /v1/classifiers` - create (multipart `training_metadata` + `training_data`)
//! - `DELETE /v1/classifiers/{id}` - delete
//! - `POST   /v1/classifiers/{id}/classify` - classify `{"text": ...}`

use super::http::{endpoint, parse_base, send_json, send_json_or_empty, with_basic_auth};
use super::{
    Classification, ClassifierService, ClassifierStatus, ClassifierSummary, NewClassifier,
    ServiceError, ServiceResult,
};
use async_trait::async_trait;
use qam_common::config::ServiceCredentials;
use reqwest::{multipart, Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

const SERVICE: &str = "Natural Language Classifier";

#[derive(Debug, Deserialize)]
struct ClassifierList {
    #[serde(default)]
    classifiers: Vec<ClassifierSummary>,
}

pub struct NlcClient {
    http: Client,
    base: Url,
    username: String,
    password: String,
}

impl NlcClient {
    pub fn new(http: Client, credentials: &ServiceCredentials) -> ServiceResult<Self> {
        Ok(Self {
            http,
            base: parse_base(SERVICE, &credentials.url)?,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut all = vec!["v1", "classifiers"];
        all.extend_from_slice(segments);
        endpoint(SERVICE, &self.base, &all)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        with_basic_auth(request, &self.username, &self.password)
    }
}

#[async_trait]
impl ClassifierService for NlcClient {
    async fn list(&self) -> ServiceResult<Vec<ClassifierSummary>> {
        let list: ClassifierList =
            send_json(SERVICE, self.authed(self.http.get(self.url(&[])?))).await?;
        debug!(count = list.classifiers.len(), "Listed classifiers");
        Ok(list.classifiers)
    }

    async fn status(&self, classifier_id: &str) -> ServiceResult<ClassifierStatus> {
        send_json(SERVICE, self.authed(self.http.get(self.url(&[classifier_id])?))).await
    }

    async fn create(&self, request: NewClassifier) -> ServiceResult<ClassifierStatus> {
        info!(name = %request.name, language = %request.language, bytes = request.training_data.len(), "Creating classifier");

        let metadata = json!({
            "language": request.language,
            "name": request.name,
        });
        let training_data = multipart::Part::bytes(request.training_data)
            .file_name(format!("{}.csv", request.name))
            .mime_str("text/csv")
            .map_err(|e| ServiceError::Transport {
                service: SERVICE,
                message: e.to_string(),
            })?;
        let form = multipart::Form::new()
            .text("training_metadata", metadata.to_string())
            .part("training_data", training_data);

        send_json(SERVICE, self.authed(self.http.post(self.url(&[])?).multipart(form))).await
    }

    async fn remove(&self, classifier_id: &str) -> ServiceResult<Value> {
        info!(classifier_id, "Deleting classifier");
        send_json_or_empty(SERVICE, self.authed(self.http.delete(self.url(&[classifier_id])?)))
            .await
    }

    async fn classify(&self, classifier_id: &str, text: &str) -> ServiceResult<Classification> {
        let request = self
            .http
            .post(self.url(&[classifier_id, "classify"])?)
            .json(&json!({ "text": text }));
        send_json(SERVICE, self.authed(request)).await
    }
}
