//! Service reliability simulator.
//!
//! A small backend service exercising retry, timeout and structured logging
//! patterns, and the UI proxy that fronts it.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser ──▶ ui-proxy (:3000) ──/api/*──▶ reliability-sim (:8000)
//!                  │    │                        │
//!                  │    └─ /api/logs ◀── logs/service.log ◀── JSON lines
//!                  └─ static UI files            │
//!                                               ▼
//!                             /unstable → retry executor
//!                                           → timeout wrapper
//!                                             → unstable operation
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod proxy;
pub mod resilience;
pub mod simulation;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::SimConfig;
pub use http::ServiceServer;
pub use lifecycle::Shutdown;
pub use proxy::ProxyServer;
