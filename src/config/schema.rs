//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both the
//! backend service and the UI proxy. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::RetryPolicy;

/// Root configuration shared by both binaries.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SimConfig {
    /// Backend service listener.
    pub service: ServiceConfig,

    /// Retry/timeout policy and delay for the unstable operation.
    pub unstable: UnstableConfig,

    /// Framework-level request timeouts.
    pub timeouts: TimeoutConfig,

    /// UI proxy settings.
    pub proxy: ProxyConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Backend service listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bind address (e.g., "127.0.0.1:8000").
    pub bind_address: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Policy for `/unstable`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UnstableConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Linear backoff unit in seconds.
    pub backoff_secs: f64,

    /// Per-attempt timeout in seconds.
    pub timeout_secs: f64,

    /// How long the slow branch sleeps. Must exceed `timeout_secs`.
    pub slow_delay_secs: f64,
}

impl Default for UnstableConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_secs: 0.2,
            timeout_secs: 1.0,
            slow_delay_secs: 5.0,
        }
    }
}

impl UnstableConfig {
    /// Build the retry policy. Only call on a validated config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_secs_f64(self.backoff_secs),
            Duration::from_secs_f64(self.timeout_secs),
        )
    }

    pub fn slow_delay(&self) -> Duration {
        Duration::from_secs_f64(self.slow_delay_secs)
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// UI proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Bind address for the UI proxy.
    pub bind_address: String,

    /// Backend base URL, without trailing slash.
    pub backend_url: String,

    /// Path prefix forwarded to the backend (e.g., "/api").
    pub api_prefix: String,

    /// Upper bound on a single forwarded call, in seconds.
    pub upstream_timeout_secs: u64,

    /// Directory holding the static UI files.
    pub static_dir: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            backend_url: "http://127.0.0.1:8000".to_string(),
            api_prefix: "/api".to_string(),
            upstream_timeout_secs: 12,
            static_dir: "ui".to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// JSON-lines log file, shared by the service (writer) and proxy (reader).
    pub log_file: String,

    /// Minimum level written to the log file.
    pub file_level: String,

    /// Console level used when `RUST_LOG` is unset.
    pub console_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_file: "logs/service.log".to_string(),
            file_level: "info".to_string(),
            console_level: "warn".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
