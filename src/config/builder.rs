//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
    source: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            source: None,
        }
    }

    /// Load configuration from `path`, or from the first default location
    ///
    /// Containers can only be declared in a file, so a missing file is an
    /// error either way.
    pub fn with_file(mut self, path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => ConfigFile::find_default().ok_or_else(|| {
                let searched = ConfigFile::default_paths()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                ConfigError::FileNotFound(format!("searched {}", searched))
            })?,
        };

        self.config = ConfigFile::load(&path)?;
        log::info!("Loaded config from {}", path.display());
        self.source = Some(path);
        Ok(self)
    }

    /// Use an already parsed configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Override with CLI iteration count
    pub fn with_iterations(mut self, iterations: Option<u64>) -> Self {
        if let Some(i) = iterations {
            self.config.general.iterations = i;
        }
        self
    }

    /// Override with CLI poll interval
    pub fn with_interval_millis(mut self, interval: Option<u64>) -> Self {
        if let Some(i) = interval {
            self.config.general.interval_millis = i;
        }
        self
    }

    /// File the configuration was read from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
