//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Config first, then logging, then listeners (traffic only when ready)

use std::path::{Path, PathBuf};

use tokio::net::TcpListener;

use crate::config::{load_or_default, ConfigError, SimConfig};
use crate::observability::{init_logging, LogGuard, LoggingError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error("{} not found", .0.display())]
    MissingIndex(PathBuf),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Backend startup: config first, then the log sink.
pub fn init_service(config_path: Option<&Path>) -> Result<(SimConfig, LogGuard), StartupError> {
    let config = load_or_default(config_path)?;
    let guard = init_logging(&config.observability)?;
    Ok((config, guard))
}

/// UI proxy startup: config, then the static index. Returns the index path.
pub fn init_proxy(config_path: Option<&Path>) -> Result<(SimConfig, PathBuf), StartupError> {
    let config = load_or_default(config_path)?;
    let index = ensure_static_index(Path::new(&config.proxy.static_dir))?;
    Ok((config, index))
}

/// The UI proxy has nothing to serve without `index.html`.
pub fn ensure_static_index(static_dir: &Path) -> Result<PathBuf, StartupError> {
    let index = static_dir.join("index.html");
    if index.is_file() {
        Ok(index)
    } else {
        Err(StartupError::MissingIndex(index))
    }
}

pub async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}
