//! TOML-based configuration for the client binary.
//!
//! Mirrors the server's config handling: a missing file yields the defaults,
//! partial files override only the named fields.

use std::path::{Path, PathBuf};

use grid_core::{MAX_MATRIX_SIZE, MAX_WORKERS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "grid-client.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field value is outside the range the protocol accepts.
    #[error("config value out of range: {0}")]
    OutOfRange(String),
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub client: GeneralConfig,
}

/// Where to find the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// `host:port` of the server's session listener.
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
}

/// What to ask the server to compute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobConfig {
    /// Worker count requested from the server (1..=64).
    #[serde(default = "default_workers")]
    pub workers: u32,
    /// Side length of the generated matrix (1..=1000).
    #[serde(default = "default_matrix_size")]
    pub matrix_size: u32,
}

/// General client behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_server_addr() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_workers() -> u32 {
    8
}
fn default_matrix_size() -> u32 {
    100
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            matrix_size: default_matrix_size(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Checks the job parameters against the protocol limits, so an invalid
    /// request fails before a connection is opened rather than mid-session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] when a value the server would
    /// reject is configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.job.workers == 0 || self.job.workers > MAX_WORKERS {
            return Err(ConfigError::OutOfRange(format!(
                "workers = {}; allowed 1..={MAX_WORKERS}",
                self.job.workers
            )));
        }
        if self.job.matrix_size == 0 || self.job.matrix_size > MAX_MATRIX_SIZE {
            return Err(ConfigError::OutOfRange(format!(
                "matrix_size = {}; allowed 1..={MAX_MATRIX_SIZE}",
                self.job.matrix_size
            )));
        }
        Ok(())
    }
}

/// Loads the configuration from `path`, returning `ClientConfig::default()`
/// if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ClientConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_expected_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.connection.server_addr, "127.0.0.1:5000");
        assert_eq!(cfg.job.workers, 8);
        assert_eq!(cfg.job.matrix_size, 100);
        assert_eq!(cfg.client.log_level, "info");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut cfg = ClientConfig::default();
        cfg.job.workers = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_matrix() {
        let mut cfg = ClientConfig::default();
        cfg.job.matrix_size = 1001;
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange(_))));
    }

    #[test]
    fn test_validate_accepts_the_protocol_limits() {
        let mut cfg = ClientConfig::default();
        cfg.job.workers = 64;
        cfg.job.matrix_size = 1000;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let toml_str = r#"
[job]
workers = 4
"#;
        let cfg: ClientConfig = toml::from_str(toml_str).expect("deserialize");
        assert_eq!(cfg.job.workers, 4);
        assert_eq!(cfg.job.matrix_size, 100);
        assert_eq!(cfg.connection.server_addr, "127.0.0.1:5000");
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut cfg = ClientConfig::default();
        cfg.connection.server_addr = "192.168.1.10:6000".to_string();
        cfg.job.matrix_size = 500;

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ClientConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = Path::new("/nonexistent/grid-client-test/config.toml");
        let cfg = load_config(path).expect("missing file must not be an error");
        assert_eq!(cfg, ClientConfig::default());
    }
}
