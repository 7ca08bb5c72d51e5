//! # Configuration
//!
//! Client settings live in a `settings.toml` file:
//!
//! ```toml
//! [server]
//! base_url = "http://127.0.0.1:5000"
//!
//! [logging]
//! filter = "info"
//! ```
//!
//! ## Path Resolution
//!
//! 1. Explicit directory passed to [`load_with_override`]
//! 2. `LESIONSCOPE_CONFIG_DIR` environment variable (if set and non-empty)
//! 3. Platform config directory (`~/.config/Lesionscope/` on Linux)
//!
//! `LESIONSCOPE_SERVER_URL` overrides `server.base_url` after loading.
//! WASM builds have no config file and always use the defaults.

#[cfg(not(target_arch = "wasm32"))]
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DiagError, DiagResult};

/// Application name used for the config directory
const APP_NAME: &str = "Lesionscope";

const CONFIG_FILE: &str = "settings.toml";

/// Environment variable to override the config directory
pub const ENV_CONFIG_DIR: &str = "LESIONSCOPE_CONFIG_DIR";

/// Environment variable to override the server base URL
pub const ENV_SERVER_URL: &str = "LESIONSCOPE_SERVER_URL";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Scheme, host and port of the classifier; `/predict` is appended
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_SERVER_URL) {
            self.server.base_url = url;
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the config file path
pub fn config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    let dir = base_dir
        .or_else(|| non_empty_env(ENV_CONFIG_DIR).map(PathBuf::from))
        .or_else(platform_config_dir)?;
    Some(dir.join(CONFIG_FILE))
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(target_arch = "wasm32")]
fn platform_config_dir() -> Option<PathBuf> {
    let _ = APP_NAME;
    None
}

/// Load the configuration from the default location.
///
/// Returns the config and, if the file existed but could not be parsed, a
/// warning for the caller to surface. Defaults are used in that case.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Load the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    let (config, warning) = match config_path_with_override(base_dir) {
        Some(path) if path.exists() => match load_from_path(&path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e.to_string())),
        },
        _ => (Config::default(), None),
    };
    (config.with_env_overrides(), warning)
}

/// Load configuration from a specific file
#[cfg(not(target_arch = "wasm32"))]
pub fn load_from_path(path: &Path) -> DiagResult<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| DiagError::config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| DiagError::config(format!("{}: {}", path.display(), e)))
}

#[cfg(target_arch = "wasm32")]
pub fn load_from_path(path: &Path) -> DiagResult<Config> {
    Err(DiagError::config(format!("{}: no filesystem", path.display())))
}
