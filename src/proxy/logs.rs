//! Raw log file access for the UI.

use std::io::ErrorKind;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::proxy::error::{ProxyError, TEXT_PLAIN};
use crate::proxy::server::ProxyState;

/// Return the log file as plain text. A missing file is an empty log.
pub async fn serve_logs(State(state): State<ProxyState>) -> Result<Response, ProxyError> {
    let data = match tokio::fs::read(&state.log_file).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(ProxyError::LogRead(e)),
    };

    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], data).into_response())
}
