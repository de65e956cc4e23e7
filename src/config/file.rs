//! Configuration file loading
//!
//! Handles loading configuration from TOML files.

use crate::config::Config;
use crate::error::ConfigError;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::ParseError(format!("{}: {}", path.display(), e)),
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// First default location that exists
    pub fn find_default() -> Option<PathBuf> {
        Self::default_paths().into_iter().find(|p| p.is_file())
    }

    /// Get default configuration file paths, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("alertd.toml"), PathBuf::from(".alertd.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("alertd").join("config.toml"));
        }

        paths.push(PathBuf::from("/etc/alertd/config.toml"));
        paths
    }
}
