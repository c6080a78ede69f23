//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SimConfig (validated, immutable)
//!     → cloned into each server's state at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{ObservabilityConfig, ProxyConfig, ServiceConfig, SimConfig, TimeoutConfig, UnstableConfig};
pub use validation::{validate_config, ValidationError};
