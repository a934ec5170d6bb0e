//! Configuration file support for RBN Filter.
//!
//! Loads settings from `~/.config/rbn-filter/config.toml` on Linux
//! (or platform-appropriate location on other OSes), or from an explicit
//! path. Command-line options override file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::{DEFAULT_CONNECT_TIMEOUT, RBN_HOST, RBN_PORT_CW};
use crate::filter::{FilterConfig, FilterSet};

/// Application configuration loaded from TOML file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Callsign to use for RBN login.
    pub callsign: Option<String>,

    /// RBN server hostname.
    pub host: String,

    /// RBN server port.
    pub port: u16,

    /// Connection timeout in seconds.
    pub connect_timeout: u64,

    /// Print matches as JSON lines instead of the text view.
    pub json: bool,

    /// Per-field filters.
    pub filters: FilterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            callsign: None,
            host: RBN_HOST.to_string(),
            port: RBN_PORT_CW,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            json: false,
            filters: FilterConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present, otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in config file: {}", path.display()))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rbn-filter/config.toml"))
    }

    /// Compile the configured filters.
    pub fn filter_set(&self) -> Result<FilterSet> {
        FilterSet::from_config(&self.filters).context("Invalid filter configuration")
    }
}
