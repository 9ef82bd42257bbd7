//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, Uri},
    response::Response,
    routing::any,
    Router,
};
use pdf_relay::config::RelayConfig;
use pdf_relay::http::HttpServer;
use pdf_relay::lifecycle::Shutdown;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

pub const TEST_KEY: &str = "test-access-key";

/// One request seen by the mock provider.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub content_type: Option<String>,
    pub query: Option<String>,
    pub body: String,
}

impl RecordedCall {
    /// Decoded query or form parameters.
    pub fn params(&self) -> Vec<(String, String)> {
        let raw = if self.method == Method::GET {
            self.query.clone().unwrap_or_default()
        } else {
            self.body.clone()
        };
        url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
    }

    pub fn param(&self, key: &str) -> Option<String> {
        self.params().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

type Responder = Arc<dyn Fn(&RecordedCall) -> Response + Send + Sync>;

#[derive(Clone)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    respond: Responder,
}

/// An in-process stand-in for the conversion provider.
pub struct MockProvider {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/convert", self.addr)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let call = RecordedCall {
        method,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        query: uri.query().map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let response = (state.respond)(&call);
    state.calls.lock().unwrap().push(call);
    response
}

/// Start a mock provider answering every call with `respond`.
pub async fn start_mock_provider<F>(respond: F) -> MockProvider
where
    F: Fn(&RecordedCall) -> Response + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        calls: calls.clone(),
        respond: Arc::new(respond),
    };
    let app = Router::new()
        .route("/api/convert", any(record))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockProvider { addr, calls }
}

/// Start a backend that writes `raw` to every connection and closes it.
pub async fn start_raw_backend(raw: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    addr
}

/// Relay config pointed at `endpoint` with the test key injected.
pub fn relay_config(endpoint: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.endpoint = endpoint.to_string();
    config.upstream.access_key = Some(TEST_KEY.to_string());
    config
}

/// Start the relay on an ephemeral port. Keep the `Shutdown` alive for the test.
pub async fn start_relay(config: RelayConfig) -> (String, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (format!("http://{}", addr), shutdown)
}
