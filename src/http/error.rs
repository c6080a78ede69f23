//! Handler-boundary errors.
//!
//! This is the only place failures become status codes. Every variant logs
//! itself on the way out; clients only ever see the short `detail` text.

use std::any::Any;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::resilience::RetryExhausted;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or non-numeric input.
    #[error("Invalid input")]
    Validation { endpoint: &'static str, reason: String },

    /// Retries exhausted, last attempt timed out.
    #[error("operation timed out")]
    OperationTimedOut { endpoint: &'static str, reason: String },

    /// Retries exhausted, last attempt failed.
    #[error("internal failure")]
    OperationFailed { endpoint: &'static str, reason: String },

    /// Anything else. The reason is logged, never returned.
    #[error("internal server error")]
    Internal {
        endpoint: Option<String>,
        reason: String,
        exc_info: Option<String>,
    },
}

impl ApiError {
    pub fn validation(endpoint: &'static str, reason: impl Into<String>) -> Self {
        ApiError::Validation {
            endpoint,
            reason: reason.into(),
        }
    }

    /// Map an exhausted retry loop, keeping timeout and failure apart.
    pub fn exhausted(endpoint: &'static str, err: RetryExhausted) -> Self {
        let reason = err.last_error.to_string();
        if err.is_timeout() {
            ApiError::OperationTimedOut { endpoint, reason }
        } else {
            ApiError::OperationFailed { endpoint, reason }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::OperationTimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::OperationFailed { .. } | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            ApiError::Validation { endpoint, reason } => {
                tracing::warn!(endpoint = *endpoint, error_reason = %reason, "validation failure");
            }
            ApiError::OperationTimedOut { endpoint, reason } => {
                tracing::error!(endpoint = *endpoint, error_reason = %reason, "operation timed out");
            }
            ApiError::OperationFailed { endpoint, reason } => {
                tracing::error!(endpoint = *endpoint, error_reason = %reason, "operation failed");
            }
            ApiError::Internal {
                endpoint,
                reason,
                exc_info,
            } => {
                tracing::error!(
                    endpoint = endpoint.as_deref(),
                    error_reason = %reason,
                    exc_info = exc_info.as_deref(),
                    "unhandled exception"
                );
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

tokio::task_local! {
    static REQUEST_PATH: String;
}

/// Keep the request path visible to [`handle_panic`]. Must sit outside
/// `CatchPanicLayer`.
pub async fn scope_request_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    REQUEST_PATH.scope(path, next.run(request)).await
}

/// `CatchPanicLayer` hook: turns a handler panic into a redacted 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::Internal {
        endpoint: REQUEST_PATH.try_with(Clone::clone).ok(),
        reason,
        exc_info: Some("panic".to_string()),
    }
    .into_response()
}
