//! Relay error taxonomy and its JSON rendering.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// Errors produced while handling a conversion request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No access key configured.
    #[error("Server is missing PDFLAYER_ACCESS_KEY.")]
    MissingCredential,

    /// Request body is not valid JSON.
    #[error("Request body must be valid JSON.")]
    InvalidBody,

    /// Request body rejected while being read (e.g. too large).
    #[error("{message}")]
    BodyRejected { status: StatusCode, message: String },

    #[error("Mode must be 'url' or 'html'.")]
    InvalidMode,

    #[error("document_url is required.")]
    MissingDocumentUrl,

    #[error("document_html is required.")]
    MissingDocumentHtml,

    /// Provider answered with an error status or a JSON payload.
    #[error("upstream responded with status {status}")]
    Upstream { status: StatusCode, body: Bytes },

    /// Transport failure talking to the provider.
    #[error("Unexpected server error.")]
    Unexpected(#[from] reqwest::Error),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl RelayError {
    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingCredential | RelayError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::InvalidBody
            | RelayError::InvalidMode
            | RelayError::MissingDocumentUrl
            | RelayError::MissingDocumentHtml => StatusCode::BAD_REQUEST,
            RelayError::BodyRejected { status, .. } => *status,
            RelayError::Upstream { status, .. } => *status,
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingCredential => "configuration",
            RelayError::InvalidBody
            | RelayError::BodyRejected { .. }
            | RelayError::InvalidMode
            | RelayError::MissingDocumentUrl
            | RelayError::MissingDocumentHtml => "validation",
            RelayError::Upstream { .. } => "upstream",
            RelayError::Unexpected(_) => "unexpected",
        }
    }

    /// Build an upstream error, substituting a generic payload for an empty body.
    ///
    /// The body is relayed as text: invalid UTF-8 sequences become U+FFFD.
    pub fn upstream(status: StatusCode, body: Bytes, service_name: &str) -> Self {
        let body = if body.is_empty() {
            let fallback = format!("{} error", service_name);
            let json = serde_json::to_vec(&ErrorBody { error: &fallback })
                .unwrap_or_else(|_| br#"{"error":"upstream error"}"#.to_vec());
            Bytes::from(json)
        } else {
            match String::from_utf8_lossy(&body) {
                Cow::Borrowed(_) => body,
                Cow::Owned(text) => Bytes::from(text),
            }
        };
        RelayError::Upstream { status, body }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            RelayError::Upstream { body, .. } => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = status;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                response
            }
            other => {
                let message = other.to_string();
                (status, Json(ErrorBody { error: &message })).into_response()
            }
        }
    }
}
