//! TOML-based configuration for the server binary.
//!
//! The config file is optional: a missing file yields the full default
//! configuration, so the server runs out of the box on first start. Fields
//! absent from a partial file fall back to their `#[serde(default)]` values,
//! which also keeps old config files working when new fields are added.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "grid-server.toml";

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
}

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub server: GeneralConfig,
}

/// Listener address settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// TCP port the session listener binds.
    #[serde(default = "default_port")]
    pub port: u16,
    /// IP address to bind. `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// General server behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_port() -> u16 {
    5000
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
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

impl ServerConfig {
    /// The `address:port` string the listener binds.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.network.bind_address, self.network.port)
    }
}

/// Loads the configuration from `path`, returning `ServerConfig::default()`
/// if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ServerConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
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
        let cfg = ServerConfig::default();
        assert_eq!(cfg.network.port, 5000);
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
        assert_eq!(cfg.server.log_level, "info");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut cfg = ServerConfig::default();
        cfg.network.port = 9000;
        cfg.server.log_level = "debug".to_string();

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ServerConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let cfg: ServerConfig = toml::from_str("").expect("deserialize");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let toml_str = r#"
[network]
port = 9999
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).expect("deserialize");
        assert_eq!(cfg.network.port, 9999);
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
        assert_eq!(cfg.server.log_level, "info");
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result: Result<ServerConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = Path::new("/nonexistent/grid-server-test/config.toml");
        let cfg = load_config(path).expect("missing file must not be an error");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_load_config_reads_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("grid_server_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[network]\nport = 6001\n").unwrap();

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.network.port, 6001);

        std::fs::remove_dir_all(&dir).ok();
    }
}
