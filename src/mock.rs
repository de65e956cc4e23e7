//! Mock implementations for testing
//!
//! Provides an in-memory container runtime and notifiers that record, fail or
//! stall, for exercising the alert core without Docker or network access.

use crate::alerts::{AlertBatch, Notifier};
use crate::domain::{ContainerState, UsageSnapshot};
use crate::error::{ChannelError, RuntimeError, NOT_FOUND_SIGNATURE};
use crate::runtime::ContainerRuntime;

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct MockContainer {
    state: ContainerState,
    usage: UsageSnapshot,
}

/// In-memory container runtime
#[derive(Debug, Default)]
pub struct MockRuntime {
    containers: RwLock<HashMap<String, MockContainer>>,
    inspect_errors: RwLock<HashMap<String, RuntimeError>>,
    stats_errors: RwLock<HashMap<String, RuntimeError>>,
    inspect_calls: Mutex<HashMap<String, usize>>,
    stats_calls: Mutex<HashMap<String, usize>>,
}

impl MockRuntime {
    /// Create a runtime with no containers
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a container
    pub fn with_container(
        self,
        name: impl Into<String>,
        state: ContainerState,
        usage: UsageSnapshot,
    ) -> Self {
        self.containers
            .write()
            .unwrap()
            .insert(name.into(), MockContainer { state, usage });
        self
    }

    /// Set the lifecycle state, creating the container if needed
    pub fn set_state(&self, name: &str, state: ContainerState) {
        self.containers
            .write()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .state = state;
    }

    /// Set the usage sample, creating the container if needed
    pub fn set_usage(&self, name: &str, usage: UsageSnapshot) {
        self.containers
            .write()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .usage = usage;
    }

    /// Remove a container so inspection reports it missing
    pub fn remove(&self, name: &str) {
        self.containers.write().unwrap().remove(name);
    }

    /// Make `inspect` fail with `error`
    pub fn fail_inspect(&self, name: &str, error: RuntimeError) {
        self.inspect_errors
            .write()
            .unwrap()
            .insert(name.to_string(), error);
    }

    /// Make `stats` fail with `error`
    pub fn fail_stats(&self, name: &str, error: RuntimeError) {
        self.stats_errors
            .write()
            .unwrap()
            .insert(name.to_string(), error);
    }

    /// Clear injected failures
    pub fn heal(&self, name: &str) {
        self.inspect_errors.write().unwrap().remove(name);
        self.stats_errors.write().unwrap().remove(name);
    }

    /// Number of `inspect` calls made for a container
    pub fn inspect_calls(&self, name: &str) -> usize {
        self.inspect_calls
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Number of `stats` calls made for a container
    pub fn stats_calls(&self, name: &str) -> usize {
        self.stats_calls
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }
}

fn count(calls: &Mutex<HashMap<String, usize>>, name: &str) {
    *calls.lock().unwrap().entry(name.to_string()).or_insert(0) += 1;
}

impl ContainerRuntime for MockRuntime {
    fn inspect(&self, name: &str) -> Result<ContainerState, RuntimeError> {
        count(&self.inspect_calls, name);

        if let Some(error) = self.inspect_errors.read().unwrap().get(name) {
            return Err(error.clone());
        }

        self.containers
            .read()
            .unwrap()
            .get(name)
            .map(|c| c.state.clone())
            .ok_or_else(|| {
                RuntimeError::NotFound(format!("{} {}", NOT_FOUND_SIGNATURE, name))
            })
    }

    fn stats(&self, name: &str) -> Result<UsageSnapshot, RuntimeError> {
        count(&self.stats_calls, name);

        if let Some(error) = self.stats_errors.read().unwrap().get(name) {
            return Err(error.clone());
        }

        self.containers
            .read()
            .unwrap()
            .get(name)
            .map(|c| c.usage.clone())
            .ok_or_else(|| {
                RuntimeError::NotFound(format!("{} {}", NOT_FOUND_SIGNATURE, name))
            })
    }
}

/// Notifier that keeps every batch it receives
#[derive(Debug)]
pub struct RecordingNotifier {
    name: String,
    batches: Mutex<Vec<AlertBatch>>,
}

impl RecordingNotifier {
    /// Create a recorder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Batches received so far
    pub fn batches(&self) -> Vec<AlertBatch> {
        self.batches.lock().unwrap().clone()
    }

    /// Number of batches received
    pub fn count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, batch: &AlertBatch) -> Result<(), ChannelError> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Notifier that always fails
#[derive(Debug)]
pub struct FailingNotifier {
    name: String,
}

impl FailingNotifier {
    /// Create a failing notifier
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Notifier for FailingNotifier {
    fn notify(&self, _batch: &AlertBatch) -> Result<(), ChannelError> {
        Err(ChannelError::Status {
            channel: self.name.clone(),
            status: 500,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Notifier that takes a fixed time to deliver
#[derive(Debug)]
pub struct SlowNotifier {
    name: String,
    delay: Duration,
}

impl SlowNotifier {
    /// Create a notifier that sleeps for `delay` before succeeding
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

impl Notifier for SlowNotifier {
    fn notify(&self, _batch: &AlertBatch) -> Result<(), ChannelError> {
        std::thread::sleep(self.delay);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
