//! The conversion relay: one inbound request, one outbound call.

use std::time::Instant;

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::convert::error::{RelayError, RelayResult};
use crate::convert::request::{ConversionRequest, ExternalCall};
use crate::convert::upstream::{Document, UpstreamClient};
use crate::observability::metrics;

/// Validates requests and forwards them to the provider.
///
/// The access key is injected at construction; `None` makes every
/// conversion fail with [`RelayError::MissingCredential`].
#[derive(Clone)]
pub struct ConversionRelay {
    access_key: Option<String>,
    upstream: UpstreamClient,
}

impl ConversionRelay {
    pub fn new(access_key: Option<String>, upstream: UpstreamClient) -> Self {
        let access_key = access_key.filter(|k| !k.is_empty());
        Self { access_key, upstream }
    }

    pub fn has_credential(&self) -> bool {
        self.access_key.is_some()
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Convert a raw JSON request body.
    ///
    /// The credential is checked before the body is even parsed.
    pub async fn convert(&self, body: &[u8]) -> RelayResult<Document> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or(RelayError::MissingCredential)?;

        let request = ConversionRequest::from_json(body)?;
        self.forward(access_key, &request).await
    }

    async fn forward(
        &self,
        access_key: &str,
        request: &ConversionRequest,
    ) -> RelayResult<Document> {
        let mode = request.mode();
        let call = ExternalCall::build(self.upstream.endpoint(), access_key, request);

        tracing::debug!(
            mode = %mode,
            options = request.options.len(),
            "Forwarding conversion to upstream"
        );

        let start = Instant::now();
        let result = self.upstream.execute(call).await;
        metrics::record_upstream_call(mode.as_str(), start);

        match &result {
            Ok(doc) => tracing::info!(
                mode = %mode,
                status = %doc.status,
                bytes = doc.body.len(),
                "Conversion succeeded"
            ),
            Err(RelayError::Upstream { status, .. }) => tracing::warn!(
                mode = %mode,
                status = %status,
                "Upstream reported an error"
            ),
            Err(e) => tracing::error!(
                mode = %mode,
                error = ?e,
                "Upstream call failed"
            ),
        }

        result
    }
}

impl IntoResponse for Document {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        if let Some(content_type) = self.content_type {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        if let Some(disposition) = self.content_disposition {
            headers.insert(header::CONTENT_DISPOSITION, disposition);
        }
        response
    }
}
