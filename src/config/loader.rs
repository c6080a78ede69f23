//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::SimConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SimConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: SimConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise validate and return the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<SimConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = SimConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("reliability-sim-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = temp_file("[service]\nbind_address = \"127.0.0.1:9999\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.service.bind_address, "127.0.0.1:9999");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = temp_file("[unstable]\ntimeout_secs = 0.0\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("timeout_secs"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_reports_parse_error() {
        let path = temp_file("[unstable\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("reliability-sim-does-not-exist.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(load_or_default(None).is_ok());
    }
}
