//! Client for the pdf-relay HTTP API.

use std::collections::BTreeMap;

use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the client before a relay answer could be classified.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request to relay failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Flat conversion payload accepted by `POST /api/convert`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_html: Option<String>,
    #[serde(flatten)]
    pub options: BTreeMap<String, String>,
}

impl ConvertRequest {
    pub fn url(document_url: &str) -> Self {
        Self {
            mode: "url".to_string(),
            document_url: Some(document_url.to_string()),
            ..Default::default()
        }
    }

    pub fn html(document_html: &str) -> Self {
        Self {
            mode: "html".to_string(),
            document_html: Some(document_html.to_string()),
            ..Default::default()
        }
    }

    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_string(), value.to_string());
        self
    }
}

/// `{ "error": "..." }` body returned by the relay.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Outcome of a conversion call.
#[derive(Debug)]
pub enum ConvertOutcome {
    /// Binary document with the relayed headers.
    Document {
        status: StatusCode,
        content_type: Option<String>,
        content_disposition: Option<String>,
        bytes: Vec<u8>,
    },
    /// JSON error payload, verbatim.
    Error { status: StatusCode, body: String },
}

impl ConvertOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            ConvertOutcome::Document { status, .. } | ConvertOutcome::Error { status, .. } => {
                *status
            }
        }
    }

    /// Parsed `error` message, if this is an error with the relay's shape.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ConvertOutcome::Error { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .map(|e| e.error),
            ConvertOutcome::Document { .. } => None,
        }
    }
}

pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: Client::new(),
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a conversion and classify the answer the way the browser form does.
    pub async fn convert(&self, req: &ConvertRequest) -> Result<ConvertOutcome, SdkError> {
        self.convert_json(req).await
    }

    /// Encode any serializable payload and submit it.
    pub async fn convert_json<T>(&self, body: &T) -> Result<ConvertOutcome, SdkError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.convert_raw(body).await
    }

    /// Submit an arbitrary JSON body.
    pub async fn convert_raw(&self, body: serde_json::Value) -> Result<ConvertOutcome, SdkError> {
        let resp = self
            .client
            .post(format!("{}/api/convert", self.relay_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let header_str = |name: header::HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header_str(header::CONTENT_TYPE);
        let content_disposition = header_str(header::CONTENT_DISPOSITION);

        let is_json = content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        if !status.is_success() || is_json {
            let body = resp.text().await?;
            return Ok(ConvertOutcome::Error { status, body });
        }

        let bytes = resp.bytes().await?.to_vec();
        Ok(ConvertOutcome::Document {
            status,
            content_type,
            content_disposition,
            bytes,
        })
    }

    /// `GET /health` as JSON.
    pub async fn health(&self) -> Result<serde_json::Value, SdkError> {
        let health = self
            .client
            .get(format!("{}/health", self.relay_url))
            .send()
            .await?
            .json()
            .await?;
        Ok(health)
    }
}
