//! Terminal outcomes leave structured records in the JSON log.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, middleware, routing::get, Router};
use reliability_sim::http::error::{handle_panic, scope_request_path};
use reliability_sim::observability::JsonLineLayer;
use reliability_sim::simulation::Branch;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

mod common;
use common::{call, fixed, get as get_req, service_router};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn records_with(&self, message: &str) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap())
            .filter(|record| record["message"] == message)
            .collect()
    }
}

/// Run `router` once for `uri` with a JSON-lines sink installed on this thread.
async fn logged_call(router: Router, uri: &str) -> (StatusCode, SharedBuf) {
    let buf = SharedBuf::default();
    let subscriber = Registry::default().with(JsonLineLayer::new(buf.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let (status, _, _) = call(router, get_req(uri)).await;
    (status, buf)
}

fn assert_single_error(buf: &SharedBuf, message: &str, endpoint: &str) {
    let records = buf.records_with(message);
    assert_eq!(records.len(), 1, "expected one '{}' record", message);

    let record = &records[0];
    assert_eq!(record["level"], "ERROR");
    assert_eq!(record["endpoint"], endpoint);
    assert!(!record["error_reason"].as_str().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_failures_log_operation_failed() {
    let (status, buf) = logged_call(service_router(fixed(Branch::Exception)), "/unstable").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_single_error(&buf, "operation failed", "/unstable");
    assert_eq!(buf.records_with("retry failure").len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_timeouts_log_operation_timed_out() {
    let (status, buf) = logged_call(service_router(fixed(Branch::Delay)), "/unstable").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_single_error(&buf, "operation timed out", "/unstable");
    assert!(buf.records_with("operation failed").is_empty());
}

#[tokio::test]
async fn test_success_logs_no_error_record() {
    let (status, buf) = logged_call(service_router(fixed(Branch::Success)), "/unstable").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(buf.records_with("unstable success").len(), 1);
    assert!(buf.records_with("operation failed").is_empty());
}

async fn boom() -> StatusCode {
    panic!("secret internal detail")
}

#[tokio::test]
async fn test_panic_log_names_the_path() {
    let router = Router::new()
        .route("/boom", get(boom))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(scope_request_path));

    let (status, buf) = logged_call(router, "/boom").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_single_error(&buf, "unhandled exception", "/boom");
    let record = &buf.records_with("unhandled exception")[0];
    assert_eq!(record["error_reason"], "secret internal detail");
    assert_eq!(record["exc_info"], "panic");
}

#[tokio::test]
async fn test_panic_outside_request_scope_has_no_endpoint() {
    let router = Router::new()
        .route("/boom", get(boom))
        .layer(CatchPanicLayer::custom(handle_panic));

    let (_, buf) = logged_call(router, "/boom").await;

    let records = buf.records_with("unhandled exception");
    assert_eq!(records.len(), 1);
    assert!(records[0].get("endpoint").is_none());
}
