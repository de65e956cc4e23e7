//! Poll loop monitor
//!
//! Drives the poll cycles: evaluates every container in configuration order,
//! gathers their batches into one, and dispatches it.

use crate::alerts::{
    AlertBatch, DispatchReport, MonitoredContainer, NotificationManager, TemplateSet,
};
use crate::config::{Config, GeneralConfig};
use crate::error::ConfigError;
use crate::runtime::ContainerRuntime;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep while waiting for the next cycle
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Configuration for the monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval between poll cycles
    pub interval: Duration,
    /// Number of cycles to run, 0 runs until stopped
    pub iterations: u64,
    /// Wait for the stopping alert to be delivered
    pub shutdown_grace: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from(&GeneralConfig::default())
    }
}

impl From<&GeneralConfig> for MonitorConfig {
    fn from(general: &GeneralConfig) -> Self {
        Self {
            interval: general.interval(),
            iterations: general.iterations,
            shutdown_grace: general.shutdown_grace(),
        }
    }
}

/// Why the loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured number of cycles ran
    Completed,
    /// A shutdown was requested
    Shutdown,
}

/// Poll loop monitor
pub struct Monitor {
    config: MonitorConfig,
    containers: Vec<MonitoredContainer>,
    templates: TemplateSet,
    notifier: NotificationManager,
    alerts: AlertBatch,
}

impl Monitor {
    /// Create a new monitor
    pub fn new(
        config: MonitorConfig,
        containers: Vec<MonitoredContainer>,
        templates: TemplateSet,
        notifier: NotificationManager,
    ) -> Self {
        Self {
            config,
            containers,
            templates,
            notifier,
            alerts: AlertBatch::new(),
        }
    }

    /// Build a monitor for a validated configuration
    pub fn from_config(config: &Config, notifier: NotificationManager) -> Result<Self, ConfigError> {
        let templates = config.template_set()?;
        let containers = config
            .containers
            .iter()
            .map(MonitoredContainer::from_config)
            .collect();

        Ok(Self::new(
            MonitorConfig::from(&config.general),
            containers,
            templates,
            notifier,
        ))
    }

    /// Get the monitor configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Monitored containers, in evaluation order
    pub fn containers(&self) -> &[MonitoredContainer] {
        &self.containers
    }

    /// Alerts gathered in the last cycle
    pub fn alerts(&self) -> &AlertBatch {
        &self.alerts
    }

    /// Evaluate every container once and dispatch what they raised
    pub fn run_cycle<R>(&mut self, runtime: &R, now: Instant) -> DispatchReport
    where
        R: ContainerRuntime + ?Sized,
    {
        self.alerts.clear();

        for container in &mut self.containers {
            let outcome = container.evaluate(runtime, &self.templates, now);
            log::debug!("{}: {:?}", container.name(), outcome);
        }

        self.alerts
            .concat(self.containers.iter().map(MonitoredContainer::batch));
        self.notifier.dispatch(&self.alerts)
    }

    /// Send the starting alert
    pub fn announce_start(&self) -> DispatchReport {
        let batch = AlertBatch::from(vec![self.templates.starting()]);
        self.notifier.dispatch(&batch)
    }

    /// Send the stopping alert, waiting at most the grace period
    pub fn announce_stop(&self) -> DispatchReport {
        let batch = AlertBatch::from(vec![self.templates.stopping()]);
        self.notifier
            .dispatch_within(&batch, self.config.shutdown_grace)
    }

    /// Run the poll loop until the iteration count is reached or `shutdown` is set
    pub fn run<R>(&mut self, runtime: &R, shutdown: &AtomicBool) -> StopReason
    where
        R: ContainerRuntime + ?Sized,
    {
        log::info!(
            "Monitoring {} container(s) every {:?}",
            self.containers.len(),
            self.config.interval
        );
        self.announce_start();

        let mut cycles = 0u64;
        let reason = loop {
            if !sleep_unless(shutdown, self.config.interval) {
                break StopReason::Shutdown;
            }

            self.run_cycle(runtime, Instant::now());
            cycles += 1;

            if self.config.iterations > 0 && cycles >= self.config.iterations {
                log::info!("Completed {} cycle(s)", cycles);
                break StopReason::Completed;
            }
        };

        if reason == StopReason::Shutdown {
            log::info!("Shutdown requested after {} cycle(s)", cycles);
            self.announce_stop();
        }

        reason
    }
}

/// Sleep for `duration` in short slices; false if `shutdown` was set
fn sleep_unless(shutdown: &AtomicBool, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        std::thread::sleep(remaining.min(SLEEP_SLICE));
    }
}
