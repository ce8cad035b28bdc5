//! Runtime Configuration
//!
//! Loads [`RuntimeConfig`] from an optional TOML file with `ACTORS_`-prefixed
//! environment variable overrides (`ACTORS_TRACE=true`, `ACTORS_WORKERS=4`,
//! `ACTORS_LOG_LEVEL=debug`). Missing keys fall back to defaults.

use crate::error::{Result, RuntimeError};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "ACTORS";

/// Tunables for a [`Runtime`](crate::Runtime) and the binaries driving it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Route create/dispatch notifications to the trace sink
    pub trace: bool,

    /// Dispatch threads used by drivers; 1 means cooperative mode
    pub workers: usize,

    /// Default `tracing` filter for binaries
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            trace: false,
            workers: 1,
            log_level: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load from `path` (if given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading runtime config: {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: RuntimeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(?config, "Runtime config loaded");
        Ok(config)
    }

    /// Parse from TOML text, without environment overrides
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RuntimeConfig = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(RuntimeError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(RuntimeError::InvalidConfig(
                "log_level cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert!(!config.trace);
        assert_eq!(config.workers, 1);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str("trace = true").unwrap();
        assert!(config.trace);
        assert_eq!(config.workers, 1);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = RuntimeConfig::from_toml_str("workers = 0").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = RuntimeConfig::from_toml_str("workers = [").unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "workers = 4").unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config = RuntimeConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(RuntimeConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_builders() {
        let config = RuntimeConfig::default().with_trace(true).with_workers(3);
        assert!(config.trace);
        assert_eq!(config.workers, 3);
    }
}
