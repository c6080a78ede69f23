//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check cross-field constraints (slow branch must outlast the timeout)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SimConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::Uri;
use tracing::Level;

use crate::config::schema::SimConfig;

/// A single violated rule, naming the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub fn validate_config(config: &SimConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "service.bind_address", &config.service.bind_address);
    check_socket_addr(&mut errors, "proxy.bind_address", &config.proxy.bind_address);

    let unstable = &config.unstable;
    if !is_duration(unstable.timeout_secs) || unstable.timeout_secs <= 0.0 {
        errors.push(ValidationError::new("unstable.timeout_secs", "must be a positive duration in seconds"));
    }
    if !is_duration(unstable.backoff_secs) {
        errors.push(ValidationError::new(
            "unstable.backoff_secs",
            "must be a non-negative duration in seconds",
        ));
    }
    if !is_duration(unstable.slow_delay_secs) || unstable.slow_delay_secs <= unstable.timeout_secs {
        errors.push(ValidationError::new(
            "unstable.slow_delay_secs",
            "must be a duration greater than unstable.timeout_secs",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }
    if config.proxy.upstream_timeout_secs == 0 {
        errors.push(ValidationError::new("proxy.upstream_timeout_secs", "must be greater than zero"));
    }

    let prefix = &config.proxy.api_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "proxy.api_prefix",
            "must start with '/' and must not end with '/'",
        ));
    }

    match Uri::from_str(&config.proxy.backend_url) {
        Ok(uri) if uri.scheme_str() == Some("http") && uri.authority().is_some() => {}
        _ => errors.push(ValidationError::new(
            "proxy.backend_url",
            format!("'{}' is not an absolute http URL", config.proxy.backend_url),
        )),
    }

    check_level(&mut errors, "observability.file_level", &config.observability.file_level);
    check_level(&mut errors, "observability.console_level", &config.observability.console_level);
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Finite, non-negative and small enough for a `Duration`.
fn is_duration(secs: f64) -> bool {
    Duration::try_from_secs_f64(secs).is_ok()
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{}' is not a socket address", value)));
    }
}

fn check_level(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if Level::from_str(value).is_err() {
        errors.push(ValidationError::new(field, format!("unknown level '{}'", value)));
    }
}
