//! Backend service setup.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, panic capture, request ID, metrics)
//! - Bind server to listener and run until shutdown

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::SimConfig;
use crate::http::error::{handle_panic, scope_request_path};
use crate::http::handlers;
use crate::http::request::with_request_id;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::simulation::{OutcomeSource, UnstableOperation};

/// Application state injected into handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub started_at: Instant,
    pub policy: RetryPolicy,
    pub operation: UnstableOperation,
}

impl AppState {
    /// Capture the start time and build the policy from a validated config.
    pub fn new(config: &SimConfig, source: Arc<dyn OutcomeSource>) -> Self {
        Self {
            started_at: Instant::now(),
            policy: config.unstable.retry_policy(),
            operation: UnstableOperation::new(source, config.unstable.slow_delay()),
        }
    }
}

/// Build the service router with all middleware layers.
#[allow(deprecated)]
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/process", post(handlers::process))
        .route("/unstable", get(handlers::unstable))
        .with_state(state)
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(scope_request_path))
        .layer(TraceLayer::new_for_http());

    with_request_id(router)
}

/// HTTP server for the backend service.
pub struct ServiceServer {
    router: Router,
    config: SimConfig,
}

impl ServiceServer {
    /// Create a new server with the given configuration and branch source.
    pub fn new(config: SimConfig, source: Arc<dyn OutcomeSource>) -> Self {
        let state = AppState::new(&config, source);
        let router = app(state, Duration::from_secs(config.timeouts.request_secs));
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener until a
    /// shutdown signal arrives.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            endpoint = "startup",
            address = %addr,
            max_retries = self.config.unstable.max_retries,
            timeout_secs = self.config.unstable.timeout_secs,
            "service startup"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(endpoint = "shutdown", "service shutdown");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
