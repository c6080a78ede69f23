//! UI proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Browser
//!     → server.rs (route by path)
//!         → logs.rs      (GET /api/logs: read log file)
//!         → forward.rs   (/api/*: strip prefix, call backend, relay)
//!         → ServeDir     (static UI files)
//! ```

pub mod error;
pub mod forward;
pub mod logs;
pub mod server;

pub use error::ProxyError;
pub use server::{proxy_app, ProxyServer, ProxyState};
