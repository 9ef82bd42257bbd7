//! Outbound calls to the conversion provider.
//!
//! # Responsibilities
//! - Issue exactly one GET or form POST per conversion
//! - Classify the provider's answer as a document or an upstream error
//! - Map transport failures to `RelayError::Unexpected`
//!
//! # Design Decisions
//! - No retries and no timeout override; the transport default applies
//! - Any JSON content-type is an error, even on 2xx

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use reqwest::Client;
use url::Url;

use crate::convert::error::{RelayError, RelayResult};
use crate::convert::request::ExternalCall;

/// A binary conversion result relayed to the caller unchanged.
#[derive(Debug, Clone)]
pub struct Document {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub content_disposition: Option<HeaderValue>,
    pub body: Bytes,
}

/// HTTP client bound to the provider endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    endpoint: Url,
    service_name: String,
}

impl UpstreamClient {
    /// Create a client for `endpoint`. `service_name` labels empty error bodies.
    pub fn new(endpoint: Url, service_name: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint, service_name)
    }

    pub fn with_client(client: Client, endpoint: Url, service_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            service_name: service_name.into(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Perform `call` and classify the response.
    pub async fn execute(&self, call: ExternalCall) -> RelayResult<Document> {
        let response = match call {
            ExternalCall::Get { url } => self.client.get(url).send().await?,
            ExternalCall::PostForm { url, body } => {
                self.client
                    .post(url)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(body)
                    .send()
                    .await?
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        classify(status, &headers, body, &self.service_name)
    }
}

/// Decide whether a provider response is a document or an error.
pub fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
    service_name: &str,
) -> RelayResult<Document> {
    let content_type = headers.get(header::CONTENT_TYPE).cloned();
    let is_json = content_type
        .as_ref()
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    if is_json || !status.is_success() {
        return Err(RelayError::upstream(status, body, service_name));
    }

    Ok(Document {
        status,
        content_type,
        content_disposition: headers.get(header::CONTENT_DISPOSITION).cloned(),
        body,
    })
}
