//! Request forwarding to the backend service.
//!
//! # Responsibilities
//! - Strip the API prefix and rewrite the URI onto the backend
//! - Copy method, headers (minus `Host`) and body
//! - Relay status, headers (minus hop-by-hop) and body back
//!
//! # Design Decisions
//! - `Accept-Encoding` is not forwarded; the relayed body is never compressed,
//!   so dropping `Content-Encoding` on the way back stays truthful
//! - Bodies stream through in both directions
//! - One pooled client, one timeout per forwarded call

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Uri},
    response::Response,
};
use hyper::body::Incoming;

use crate::proxy::error::ProxyError;
use crate::proxy::server::ProxyState;

/// Response headers never relayed to the client.
static HOP_BY_HOP: [HeaderName; 4] = [
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
    header::CONTENT_LENGTH,
    header::CONNECTION,
];

/// Request headers never forwarded to the backend.
static NOT_FORWARDED: [HeaderName; 2] = [header::HOST, header::ACCEPT_ENCODING];

/// `/api/health?x=1` → `/health?x=1`. The leading slash is kept.
pub fn backend_path<'a>(path_and_query: &'a str, prefix: &str) -> &'a str {
    match path_and_query.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => rest,
        _ => path_and_query,
    }
}

fn filter_headers(source: &HeaderMap, dropped: &[HeaderName]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if !dropped.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Forward any request under the API prefix.
pub async fn forward(State(state): State<ProxyState>, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let path = backend_path(path_and_query, &state.api_prefix);

    let target: Uri = format!("{}{}", state.backend_url, path)
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ProxyError::upstream(&e))?;

    tracing::debug!(method = %parts.method, target = %target, "Proxying request");

    let mut upstream = Request::new(body);
    *upstream.method_mut() = parts.method.clone();
    *upstream.uri_mut() = target;
    *upstream.headers_mut() = filter_headers(&parts.headers, &NOT_FORWARDED);

    let response = tokio::time::timeout(state.upstream_timeout, state.client.request(upstream))
        .await
        .map_err(|_| ProxyError::UpstreamTimeout(state.upstream_timeout))?
        .map_err(|e| ProxyError::upstream(&e))?;

    tracing::info!(
        endpoint = "proxy",
        method = %parts.method,
        path,
        status = response.status().as_u16(),
        "proxied request"
    );

    Ok(relay(response))
}

fn relay(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();

    let mut headers = filter_headers(&parts.headers, &HOP_BY_HOP);
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let mut relayed = Response::new(Body::new(body));
    *relayed.status_mut() = parts.status;
    *relayed.headers_mut() = headers;
    relayed
}
