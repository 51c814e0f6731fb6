//! Speech to Text customization client
//!
//! # API Reference
//! - `GET|POST /v1/customizations`
//! - `GET|DELETE /v1/customizations/{id}`, `POST /v1/customizations/{id}/train`
//! - `GET /v1/customizations/{id}/corpora`, `POST|DELETE .../corpora/{name}`
//! - `GET|POST /v1/customizations/{id}/words`, `DELETE .../words/{word}`

use super::http::{endpoint, parse_base, send_json, send_json_or_empty, with_basic_auth};
use super::{CustomWord, NewSpeechModel, ServiceResult, SpeechToTextService};
use async_trait::async_trait;
use qam_common::config::ServiceCredentials;
use reqwest::{header, Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

const SERVICE: &str = "Speech to Text";

#[derive(Debug, Deserialize)]
struct CorporaList {
    #[serde(default)]
    corpora: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WordList {
    #[serde(default)]
    words: Vec<Value>,
}

pub struct SttClient {
    http: Client,
    base: Url,
    username: String,
    password: String,
}

impl SttClient {
    pub fn new(http: Client, credentials: &ServiceCredentials) -> ServiceResult<Self> {
        Ok(Self {
            http,
            base: parse_base(SERVICE, &credentials.url)?,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut all = vec!["v1", "customizations"];
        all.extend_from_slice(segments);
        endpoint(SERVICE, &self.base, &all)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        with_basic_auth(request, &self.username, &self.password)
    }
}

#[async_trait]
impl SpeechToTextService for SttClient {
    async fn list_customizations(&self) -> ServiceResult<Value> {
        send_json(SERVICE, self.authed(self.http.get(self.url(&[])?))).await
    }

    async fn create_customization(&self, request: NewSpeechModel) -> ServiceResult<Value> {
        info!(name = %request.name, base_model = %request.base_model_name, "Creating speech customization");
        send_json(SERVICE, self.authed(self.http.post(self.url(&[])?).json(&request))).await
    }

    async fn get_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        send_json(SERVICE, self.authed(self.http.get(self.url(&[customization_id])?))).await
    }

    async fn train_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        info!(customization_id, "Training speech customization");
        let url = self.url(&[customization_id, "train"])?;
        send_json_or_empty(SERVICE, self.authed(self.http.post(url))).await
    }

    async fn delete_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        info!(customization_id, "Deleting speech customization");
        let url = self.url(&[customization_id])?;
        send_json_or_empty(SERVICE, self.authed(self.http.delete(url))).await
    }

    async fn list_corpora(&self, customization_id: &str) -> ServiceResult<Vec<Value>> {
        let url = self.url(&[customization_id, "corpora"])?;
        let list: CorporaList = send_json(SERVICE, self.authed(self.http.get(url))).await?;
        Ok(list.corpora)
    }

    async fn add_corpus(
        &self,
        customization_id: &str,
        name: &str,
        text: String,
    ) -> ServiceResult<Value> {
        info!(customization_id, name, bytes = text.len(), "Adding corpus");
        let url = self.url(&[customization_id, "corpora", name])?;
        let request = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(text);
        send_json_or_empty(SERVICE, self.authed(request)).await
    }

    async fn delete_corpus(&self, customization_id: &str, name: &str) -> ServiceResult<Value> {
        info!(customization_id, name, "Deleting corpus");
        let url = self.url(&[customization_id, "corpora", name])?;
        send_json_or_empty(SERVICE, self.authed(self.http.delete(url))).await
    }

    async fn list_words(&self, customization_id: &str) -> ServiceResult<Vec<Value>> {
        let url = self.url(&[customization_id, "words"])?;
        let request = self
            .http
            .get(url)
            .query(&[("sort", "+alphabetical"), ("word_type", "all")]);
        let list: WordList = send_json(SERVICE, self.authed(request)).await?;
        Ok(list.words)
    }

    async fn add_words(
        &self,
        customization_id: &str,
        words: Vec<CustomWord>,
    ) -> ServiceResult<Value> {
        info!(customization_id, count = words.len(), "Adding words");
        let url = self.url(&[customization_id, "words"])?;
        let request = self.http.post(url).json(&json!({ "words": words }));
        send_json_or_empty(SERVICE, self.authed(request)).await
    }

    async fn delete_word(&self, customization_id: &str, word: &str) -> ServiceResult<Value> {
        info!(customization_id, word, "Deleting word");
        let url = self.url(&[customization_id, "words", word])?;
        send_json_or_empty(SERVICE, self.authed(self.http.delete(url))).await
    }
}
