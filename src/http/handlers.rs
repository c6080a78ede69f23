//! Backend service endpoints: `/health`, `/process`, `/unstable`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::http::error::ApiError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::resilience::{retries, with_timeout};
use crate::simulation::OperationPayload;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = state.started_at.elapsed().as_secs();
    tracing::info!(endpoint = "/health", "health check");

    Json(HealthResponse {
        status: "OK",
        uptime_seconds,
    })
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(deserialize_with = "lax_number")]
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessResponse {
    pub input: f64,
    pub result: f64,
}

/// Accepts a JSON number, or a string holding a finite decimal number.
fn lax_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)
        .map_err(|_| <D::Error as de::Error>::custom("value must be a number"))?
    {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| de::Error::custom(format!("'{}' is not a valid number", text))),
    }
}

/// Double `value`. `None` when the result would not be a finite number.
pub fn process_value(value: f64) -> Option<ProcessResponse> {
    let result = value * 2.0;
    if !result.is_finite() {
        return None;
    }
    tracing::info!(endpoint = "/process", input = value, result, "processed value");
    Some(ProcessResponse { input: value, result })
}

pub async fn process(
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::validation("/process", rejection.body_text()))?;
    tracing::info!(endpoint = "/process", value = request.value, "request received");

    let response = process_value(request.value)
        .ok_or_else(|| ApiError::validation("/process", "result is out of range"))?;

    tracing::info!(endpoint = "/process", result = response.result, "success response");
    Ok(Json(response))
}

/// Retry the unstable operation, each attempt under the policy's timeout.
pub async fn unstable(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OperationPayload>, ApiError> {
    let request_id = request_id(&headers);
    tracing::info!(endpoint = "/unstable", request_id, "request received");

    let policy = state.policy;
    let operation = &state.operation;
    let outcome = retries::execute(&policy, move || with_timeout(policy.timeout, operation.run())).await;

    match outcome {
        Ok(payload) => {
            tracing::info!(endpoint = "/unstable", request_id, detail = payload.detail, "unstable success");
            Ok(Json(payload))
        }
        Err(exhausted) => Err(ApiError::exhausted("/unstable", exhausted)),
    }
}
