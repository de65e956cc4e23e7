//! Run command implementation
//!
//! Loads and validates the configuration, connects to Docker, and runs the
//! poll loop until it completes or a shutdown signal arrives.

use crate::alerts::channels::build_notifiers;
use crate::alerts::NotificationManager;
use crate::cli::args::RunArgs;
use crate::config::{Config, ConfigBuilder};
use crate::error::{AppError, Result};
use crate::runtime::DockerClient;
use crate::services::{Monitor, StopReason};

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Timeout for a single Docker API request
const RUNTIME_TIMEOUT: Duration = Duration::from_secs(10);

/// Load the configuration, apply CLI overrides and validate it
pub fn load_config(config_path: Option<&Path>, args: &RunArgs) -> Result<Config> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_iterations(args.iterations)
        .with_interval_millis(args.duration)
        .build();

    config.validate()?;
    Ok(config)
}

/// Execute the run command
pub fn run_daemon(config_path: Option<&Path>, args: &RunArgs) -> Result<()> {
    let config = load_config(config_path, args)?;

    let host = config.general.docker_host();
    let runtime = DockerClient::new(&host, RUNTIME_TIMEOUT)?;
    log::info!("Using Docker Engine API at {}", runtime.endpoint());

    let timeout = config.general.dispatch_timeout();
    let mut notifier = NotificationManager::new(timeout);
    for channel in build_notifiers(&config, timeout)? {
        log::info!("{} alerts active", channel.name());
        notifier.add_notifier(channel);
    }
    if notifier.notifier_count() == 0 {
        log::warn!("No notification channels configured, alerts will only be logged");
    }

    let mut monitor = Monitor::from_config(&config, notifier)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| AppError::Signal(e.to_string()))?;

    match monitor.run(&runtime, &shutdown) {
        StopReason::Completed => log::info!("Monitoring finished"),
        StopReason::Shutdown => log::info!("Monitoring stopped"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::io::Write;

    #[test]
    fn test_load_config_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[general]\ndocker_host = \"tcp://127.0.0.1:2375\"\n\n[[containers]]\nname = \"web\""
        )
        .unwrap();

        let args = RunArgs {
            iterations: Some(2),
            duration: Some(100),
        };
        let config = load_config(Some(file.path()), &args).unwrap();
        assert_eq!(config.general.iterations, 2);
        assert_eq!(config.general.interval_millis, 100);
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[general]\ndocker_host = \"tcp://127.0.0.1:2375\"\n\n[email]\nsmtp = \"smtp.example.com\""
        )
        .unwrap();

        let err = load_config(Some(file.path()), &RunArgs::default()).unwrap_err();
        match err {
            AppError::Config(ConfigError::Invalid(errors)) => {
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
