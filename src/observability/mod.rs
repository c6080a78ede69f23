//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields: endpoint, error_reason, ...)
//!         → logging.rs JSON-lines file sink
//!         → console fmt layer
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → ui-proxy serves the log file at /api/logs
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init as init_logging, JsonLineLayer, LogGuard, LoggingError};
