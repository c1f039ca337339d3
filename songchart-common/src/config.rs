//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Arguments and environment variables are both parsed by the binary (clap)
//! and arrive here as `CliOverrides`.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address (loopback only)
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Default catalog file, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "songs.json";

/// Default request body limit (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Config file name inside the per-user config directory
const CONFIG_DIR_NAME: &str = "songchart";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Bootstrap configuration loaded from TOML
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub bind_address: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Catalog file path (relative or absolute)
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub max_body_bytes: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Find the config file to load
///
/// An explicit path is always returned (a missing explicit file is an error
/// when it is read). Otherwise the per-user default location is used if a
/// file exists there.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    default_config_path().filter(|path| path.is_file())
}

/// `<config dir>/songchart/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub data_file: Option<PathBuf>,
    pub max_body_bytes: Option<usize>,
    pub log_level: Option<String>,
}

/// Effective service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub max_body_bytes: usize,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::resolve(CliOverrides::default(), TomlConfig::default())
    }
}

impl ServerConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: CliOverrides, toml: TomlConfig) -> Self {
        Self {
            bind_address: overrides
                .bind_address
                .or(toml.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            data_file: overrides
                .data_file
                .or(toml.data_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            max_body_bytes: overrides
                .max_body_bytes
                .or(toml.max_body_bytes)
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
        }
    }

    /// Listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            Error::Config(format!("Invalid bind address: {}", self.bind_address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
