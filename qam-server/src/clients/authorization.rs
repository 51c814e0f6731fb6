//! Streaming token authority
//!
//! `GET {authorization}/v1/token?url={service url}` with the target service's
//! credentials returns a short-lived token as plain text.

use super::http::{endpoint, parse_base, send_text, with_basic_auth};
use super::{ServiceResult, TokenIssuer};
use async_trait::async_trait;
use qam_common::config::ServiceCredentials;
use reqwest::{Client, Url};

const SERVICE: &str = "Authorization";

/// Issues tokens for one speech service
pub struct AuthorizationClient {
    http: Client,
    token_url: Url,
    service_url: String,
    username: String,
    password: String,
}

impl AuthorizationClient {
    /// `authorization_url` is the token authority, `service` the credentials
    /// of the speech service the token is for
    pub fn new(
        http: Client,
        authorization_url: &str,
        service: &ServiceCredentials,
    ) -> ServiceResult<Self> {
        let base = parse_base(SERVICE, authorization_url)?;
        Ok(Self {
            http,
            token_url: endpoint(SERVICE, &base, &["v1", "token"])?,
            service_url: service.url.clone(),
            username: service.username.clone(),
            password: service.password.clone(),
        })
    }
}

#[async_trait]
impl TokenIssuer for AuthorizationClient {
    async fn token(&self) -> ServiceResult<String> {
        let request = self
            .http
            .get(self.token_url.clone())
            .query(&[("url", self.service_url.as_str())]);
        let token = send_text(SERVICE, with_basic_auth(request, &self.username, &self.password))
            .await?;
        Ok(token.trim().to_string())
    }
}
