//! Text to Speech voice model client
//!
//! # API Reference
//! - `GET|POST /v1/customizations`
//! - `GET|POST|DELETE /v1/customizations/{id}`

use super::http::{endpoint, parse_base, send_json, send_json_or_empty, with_basic_auth};
use super::{NewVoiceModel, ServiceResult, TextToSpeechService, VoiceModelUpdate};
use async_trait::async_trait;
use qam_common::config::ServiceCredentials;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::info;

const SERVICE: &str = "Text to Speech";

pub struct TtsClient {
    http: Client,
    base: Url,
    username: String,
    password: String,
}

impl TtsClient {
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
impl TextToSpeechService for TtsClient {
    async fn list_customizations(&self) -> ServiceResult<Value> {
        send_json(SERVICE, self.authed(self.http.get(self.url(&[])?))).await
    }

    async fn create_customization(&self, request: NewVoiceModel) -> ServiceResult<Value> {
        info!(name = %request.name, language = %request.language, "Creating voice model");
        send_json(SERVICE, self.authed(self.http.post(self.url(&[])?).json(&request))).await
    }

    async fn get_customization(&self, customization_id: &str) -> ServiceResult<Value> {
        send_json(SERVICE, self.authed(self.http.get(self.url(&[customization_id])?))).await
    }

    async fn update_customization(
        &self,
        customization_id: &str,
        update: VoiceModelUpdate,
    ) -> ServiceResult<()> {
        info!(customization_id, words = update.words.len(), "Updating voice model");
        let request = self.http.post(self.url(&[customization_id])?).json(&update);
        send_json_or_empty(SERVICE, self.authed(request)).await?;
        Ok(())
    }

    async fn delete_customization(&self, customization_id: &str) -> ServiceResult<()> {
        info!(customization_id, "Deleting voice model");
        let url = self.url(&[customization_id])?;
        send_json_or_empty(SERVICE, self.authed(self.http.delete(url))).await?;
        Ok(())
    }
}
