//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::Path,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Json, Router,
};
use reliability_sim::config::SimConfig;
use reliability_sim::http::{app, AppState};
use reliability_sim::simulation::{Branch, FixedOutcome, OutcomeSource};
use reliability_sim::{ProxyServer, ServiceServer, Shutdown};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// In-process service router with the default policy.
pub fn service_router(source: Arc<dyn OutcomeSource>) -> Router {
    let state = AppState::new(&SimConfig::default(), source);
    app(state, Duration::from_secs(30))
}

pub fn fixed(branch: Branch) -> Arc<dyn OutcomeSource> {
    Arc::new(FixedOutcome(branch))
}

/// Send one request through `router` and decode the JSON body.
pub async fn call(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, headers, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({
        "method": method.as_str(),
        "path": uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/"),
        "host": header("host"),
        "accept_encoding": header("accept-encoding"),
        "x_custom": header("x-custom"),
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [("x-backend", "status")], format!("status {}", code))
}

/// Backend that echoes the request it received as JSON.
/// `/status/{code}` answers with that status instead.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new().route("/status/{code}", any(status)).fallback(echo);

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Backend writing a fixed raw HTTP response to every connection.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// Backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("reliability-sim-{}-{}", uuid::Uuid::new_v4(), name))
}

pub fn proxy_config(backend: SocketAddr, log_file: &std::path::Path, static_dir: &std::path::Path) -> SimConfig {
    let mut config = SimConfig::default();
    config.proxy.backend_url = format!("http://{}", backend);
    config.proxy.upstream_timeout_secs = 1;
    config.proxy.static_dir = static_dir.to_string_lossy().into_owned();
    config.observability.log_file = log_file.to_string_lossy().into_owned();
    config
}

/// Start the UI proxy on an ephemeral port.
pub async fn start_proxy(config: &SimConfig, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = ProxyServer::new(config);
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    addr
}

/// Start the backend service on an ephemeral port.
pub async fn start_service(config: SimConfig, source: Arc<dyn OutcomeSource>, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = ServiceServer::new(config, source);
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
