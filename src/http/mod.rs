//! Backend service HTTP layer.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (/health, /process, /unstable)
//!         → resilience (retry + timeout) → simulation (unstable operation)
//!     → error.rs (ApiError → status code + redacted detail)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{request_id, with_request_id, X_REQUEST_ID};
pub use server::{app, AppState, ServiceServer};
