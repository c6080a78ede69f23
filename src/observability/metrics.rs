//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sim_requests_total` (counter): requests by method, status, route
//! - `sim_request_duration_seconds` (histogram): latency distribution
//! - `sim_attempts_total` (counter): retry attempts by outcome
//!
//! Without an installed recorder the macros are no-ops, so tests and the
//! default config pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::AttemptOutcome;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error_reason = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    counter!("sim_requests_total", &labels).increment(1);
    histogram!("sim_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_attempt(outcome: AttemptOutcome) {
    counter!("sim_attempts_total", "outcome" => outcome.as_str()).increment(1);
}

/// Route template the request matched, or `"none"` for unrouted requests.
pub fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Axum middleware recording every request.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = route_label(&request);

    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), &route, start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_route(request: Request<Body>, next: Next) -> Response {
        let route = route_label(&request);
        let mut response = next.run(request).await;
        response.headers_mut().insert("x-route", route.parse().unwrap());
        response
    }

    async fn route_for(uri: &str) -> String {
        let router = Router::new()
            .route("/items/{id}", get(|| async { "item" }))
            .layer(middleware::from_fn(echo_route));
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        response.headers()["x-route"].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_routes_are_labelled_by_template() {
        assert_eq!(route_for("/items/1").await, "/items/{id}");
        assert_eq!(route_for("/items/2").await, "/items/{id}");
    }

    #[tokio::test]
    async fn test_unrouted_requests_share_one_label() {
        assert_eq!(route_for("/scan/a").await, "none");
        assert_eq!(route_for("/scan/b").await, "none");
    }
}
