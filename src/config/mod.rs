//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::channels::{
    self, EmailConfig, PushbulletConfig, PushoverConfig, SlackConfig,
};
use crate::alerts::{TemplateSet, TemplatesConfig};
use crate::error::ConfigError;
use crate::runtime::{Endpoint, DEFAULT_DOCKER_HOST};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Environment variable consulted when no docker host is configured
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Containers to monitor, in evaluation order
    pub containers: Vec<ContainerConfig>,
    /// Email channel
    pub email: EmailConfig,
    /// Slack channel
    pub slack: SlackConfig,
    /// Pushover channel
    pub pushover: PushoverConfig,
    /// Pushbullet channel
    pub pushbullet: PushbulletConfig,
    /// Alert text overrides
    pub templates: TemplatesConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Number of poll cycles to run, 0 runs until stopped
    pub iterations: u64,
    /// Time between poll cycles in milliseconds
    pub interval_millis: u64,
    /// Wait for the stopping alert to be delivered, in milliseconds
    pub shutdown_grace_millis: u64,
    /// Wait for each dispatch to finish, in milliseconds
    pub dispatch_timeout_millis: u64,
    /// Docker Engine API endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_host: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            iterations: 0,
            interval_millis: 1000,
            shutdown_grace_millis: 5000,
            dispatch_timeout_millis: 10_000,
            docker_host: None,
        }
    }
}

impl GeneralConfig {
    /// Poll interval
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }

    /// Shutdown grace period
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_millis)
    }

    /// Dispatch deadline
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_millis)
    }

    /// Docker endpoint: config file, then `DOCKER_HOST`, then the default
    pub fn docker_host(&self) -> String {
        self.docker_host
            .clone()
            .or_else(|| std::env::var(DOCKER_HOST_ENV).ok())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_DOCKER_HOST.to_string())
    }
}

/// One `[[containers]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContainerConfig {
    /// Container name or id
    pub name: String,
    /// CPU limit in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu: Option<u64>,
    /// Memory limit in MB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mem: Option<u64>,
    /// Minimum number of processes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_procs: Option<u64>,
    /// Expected running state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_running: Option<bool>,
    /// Seconds a breach must persist before alerting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<u64>,
}

impl ContainerConfig {
    /// Container with no checks beyond existence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Debounce window; zero means none
    pub fn delay(&self) -> Option<Duration> {
        self.delay_seconds
            .filter(|&s| s > 0)
            .map(Duration::from_secs)
    }
}

impl Config {
    /// Check the whole configuration, reporting every problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.containers.is_empty() {
            errors.push(ConfigError::NoContainers);
        }

        let mut seen = HashSet::new();
        for (i, container) in self.containers.iter().enumerate() {
            if container.name.trim().is_empty() {
                errors.push(ConfigError::MissingField(format!("containers[{}].name", i)));
            } else if !seen.insert(container.name.as_str()) {
                errors.push(ConfigError::InvalidValue {
                    key: format!("containers[{}].name", i),
                    message: format!("'{}' is listed more than once", container.name),
                });
            }
        }

        if self.general.interval_millis == 0 {
            errors.push(ConfigError::InvalidValue {
                key: "general.interval_millis".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let host = self.general.docker_host();
        if Endpoint::parse(&host).is_none() {
            errors.push(ConfigError::InvalidValue {
                key: "general.docker_host".to_string(),
                message: format!(
                    "unsupported endpoint '{}', use unix://, tcp:// or http://",
                    host
                ),
            });
        }

        errors.extend(channels::validate(self));

        if let Err(template_errors) = TemplateSet::build(&self.templates) {
            errors.extend(template_errors.into_iter().map(ConfigError::from));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Validated templates
    pub fn template_set(&self) -> Result<TemplateSet, ConfigError> {
        TemplateSet::build(&self.templates).map_err(|errors| {
            ConfigError::Invalid(errors.into_iter().map(ConfigError::from).collect())
        })
    }
}
