//! Proxy-side failures and their plain-text responses.

use std::io;
use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Backend unreachable or the exchange broke.
    #[error("{0}")]
    Upstream(String),

    /// Backend did not answer in time.
    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// The log file exists but could not be read.
    #[error("{0}")]
    LogRead(#[from] io::Error),
}

impl ProxyError {
    /// Flatten an error and its sources into one line.
    pub fn upstream(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut text = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        ProxyError::Upstream(text)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(_) | ProxyError::UpstreamTimeout(_) => StatusCode::BAD_GATEWAY,
            ProxyError::LogRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let text = self.to_string();
        match &self {
            ProxyError::LogRead(_) => tracing::error!(endpoint = "logs", error_reason = %text, "log read failed"),
            _ => tracing::warn!(endpoint = "proxy", error_reason = %text, "upstream request failed"),
        }
        (self.status(), [(header::CONTENT_TYPE, TEXT_PLAIN)], text).into_response()
    }
}
