//! UI proxy server setup.
//!
//! # Routes
//! - `GET <prefix>/logs` → log file as text
//! - any `<prefix>/*` → forwarded to the backend
//! - everything else → static files, 404 otherwise

use axum::{
    body::Body,
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    routing::{any, get},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::SimConfig;
use crate::http::request::with_request_id;
use crate::proxy::forward::forward;
use crate::proxy::logs::serve_logs;

/// Shared by every proxy handler.
#[derive(Clone)]
pub struct ProxyState {
    pub client: Client<HttpConnector, Body>,
    /// Backend base URL, no trailing slash.
    pub backend_url: String,
    pub api_prefix: String,
    pub upstream_timeout: Duration,
    pub log_file: PathBuf,
}

impl ProxyState {
    pub fn new(config: &SimConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            backend_url: config.proxy.backend_url.trim_end_matches('/').to_string(),
            api_prefix: config.proxy.api_prefix.clone(),
            upstream_timeout: config.proxy.upstream_timeout(),
            log_file: PathBuf::from(&config.observability.log_file),
        }
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Build the proxy router.
pub fn proxy_app(state: ProxyState, static_dir: PathBuf) -> Router {
    let prefix = state.api_prefix.clone();
    let static_files = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    let router = Router::new()
        .route(&format!("{}/logs", prefix), get(serve_logs).fallback(forward))
        .route(&format!("{}/{{*path}}", prefix), any(forward))
        .with_state(state)
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http());

    with_request_id(router)
}

/// HTTP server fronting the backend service.
pub struct ProxyServer {
    router: Router,
    backend_url: String,
}

impl ProxyServer {
    pub fn new(config: &SimConfig) -> Self {
        let state = ProxyState::new(config);
        let backend_url = state.backend_url.clone();
        let router = proxy_app(state, PathBuf::from(&config.proxy.static_dir));
        Self { router, backend_url }
    }

    /// Serve until a shutdown signal arrives.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.backend_url,
            "UI proxy listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("UI proxy stopped");
        Ok(())
    }
}
