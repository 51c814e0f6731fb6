//! Shared request plumbing for the service clients

use super::{ServiceError, ServiceResult};
use reqwest::{header, Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// User-Agent sent on every outbound request
const USER_AGENT: &str = concat!("qam-server/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every service client
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static(USER_AGENT),
    );

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
}

/// Append percent-encoded path segments to a base URL
pub(crate) fn endpoint(service: &'static str, base: &Url, segments: &[&str]) -> ServiceResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ServiceError::Transport {
            service,
            message: format!("base URL cannot carry a path: {}", base),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Parse a configured base URL
pub(crate) fn parse_base(service: &'static str, base: &str) -> ServiceResult<Url> {
    Url::parse(base.trim()).map_err(|e| ServiceError::Transport {
        service,
        message: format!("invalid base URL '{}': {}", base, e),
    })
}

/// Send a request and turn non-2xx answers into `ServiceError::Status`
pub(crate) async fn send(service: &'static str, request: RequestBuilder) -> ServiceResult<Response> {
    let response = request.send().await.map_err(|e| ServiceError::Transport {
        service,
        message: e.to_string(),
    })?;

    let status = response.status();
    debug!(service, status = status.as_u16(), url = %response.url(), "Upstream response");

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
    Err(ServiceError::Status {
        service,
        status: status.as_u16(),
        payload,
    })
}

/// Send a request and decode a JSON response body
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> ServiceResult<T> {
    let response = send(service, request).await?;
    response.json::<T>().await.map_err(|e| ServiceError::Decode {
        service,
        message: e.to_string(),
    })
}

/// Send a request whose response body may be empty
///
/// Some delete/update endpoints answer with no content; that becomes `{}`.
pub(crate) async fn send_json_or_empty(
    service: &'static str,
    request: RequestBuilder,
) -> ServiceResult<Value> {
    let response = send(service, request).await?;
    let body = response.text().await.map_err(|e| ServiceError::Decode {
        service,
        message: e.to_string(),
    })?;
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(&body).map_err(|e| ServiceError::Decode {
        service,
        message: e.to_string(),
    })
}

/// Send a request and return the response body as text
pub(crate) async fn send_text(service: &'static str, request: RequestBuilder) -> ServiceResult<String> {
    let response = send(service, request).await?;
    response.text().await.map_err(|e| ServiceError::Decode {
        service,
        message: e.to_string(),
    })
}

/// Attach basic auth when a username is configured
pub(crate) fn with_basic_auth(
    request: RequestBuilder,
    username: &str,
    password: &str,
) -> RequestBuilder {
    if username.is_empty() {
        request
    } else {
        request.basic_auth(username, Some(password))
    }
}
