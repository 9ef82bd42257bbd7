//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the conversion, health and static handlers
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::validation::{parse_endpoint, validate_config, ValidationError};
use crate::config::{ConfigError, RelayConfig, ACCESS_KEY_ENV};
use crate::convert::{ConversionRelay, RelayError, UpstreamClient};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::metrics;

/// Path of the conversion endpoint.
pub const CONVERT_PATH: &str = "/api/convert";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ConversionRelay>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let endpoint = parse_endpoint(&config.upstream.endpoint).ok_or_else(|| {
            ConfigError::Validation(vec![ValidationError::Endpoint(
                config.upstream.endpoint.clone(),
            )])
        })?;

        let upstream = UpstreamClient::new(endpoint, config.upstream.service_name.clone());
        let relay = ConversionRelay::new(config.upstream.access_key.clone(), upstream);

        if !relay.has_credential() {
            tracing::warn!(
                "Missing {}; conversions will fail until it is set",
                ACCESS_KEY_ENV
            );
        }

        let state = AppState {
            relay: Arc::new(relay),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(CONVERT_PATH, post(convert_handler))
            .route("/health", get(health_handler));

        if config.static_files.enabled {
            tracing::info!(root = %config.static_files.root, "Serving static files");
            router = router.fallback_service(ServeDir::new(&config.static_files.root));
        }

        router
            .layer(DefaultBodyLimit::max(config.listener.max_body_size))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<axum::body::Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %request_id(request),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain open connections.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// `POST /api/convert`: relay one conversion.
async fn convert_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => state.relay.convert(&body).await,
        Err(_) if !state.relay.has_credential() => Err(RelayError::MissingCredential),
        Err(rejection) => Err(RelayError::BodyRejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }),
    };

    match result {
        Ok(document) => {
            metrics::record_request("document", document.status.as_u16());
            document.into_response()
        }
        Err(e) => {
            let status = e.status();
            metrics::record_request(e.kind(), status.as_u16());
            match &e {
                RelayError::Upstream { .. } | RelayError::Unexpected(_) => {}
                other => {
                    tracing::info!(status = %status, error = %other, "Conversion rejected")
                }
            }
            e.into_response()
        }
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub credential_configured: bool,
}

/// `GET /health`.
async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        credential_configured: state.relay.has_credential(),
    })
}
