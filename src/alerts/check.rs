//! Threshold checks
//!
//! A [`MetricCheck`] compares a usage value against a limit; a [`StaticCheck`]
//! compares an observed boolean against an expectation. Both wrap a
//! [`CheckState`] and append an event to the container's batch whenever the
//! state machine reports an edge.

use super::batch::AlertBatch;
use super::state::CheckState;
use super::template::TemplateSet;
use super::types::{Edge, Metric};
use crate::domain::UsageSnapshot;
use std::time::{Duration, Instant};

/// Comparison that counts as a breach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Breach when usage is above the limit
    Exceeds,
    /// Breach when usage is below the limit
    FallsBelow,
}

impl Direction {
    fn breached(self, usage: u64, limit: u64) -> bool {
        match self {
            Self::Exceeds => usage > limit,
            Self::FallsBelow => usage < limit,
        }
    }
}

impl Metric {
    /// Breach direction for this metric
    pub fn direction(self) -> Direction {
        match self {
            Self::Cpu | Self::Memory => Direction::Exceeds,
            Self::MinProcs => Direction::FallsBelow,
        }
    }

    /// Derived usage value compared against the limit
    pub fn usage(self, snapshot: &UsageSnapshot) -> u64 {
        match self {
            Self::Cpu => snapshot.cpu_percent(),
            Self::Memory => snapshot.memory_mb(),
            Self::MinProcs => snapshot.process_count(),
        }
    }
}

/// Usage threshold check; disabled when no limit is configured
#[derive(Debug, Clone)]
pub struct MetricCheck {
    metric: Metric,
    limit: Option<u64>,
    state: CheckState,
}

impl MetricCheck {
    /// Create a check for `metric`
    pub fn new(metric: Metric, limit: Option<u64>, delay: Option<Duration>) -> Self {
        Self {
            metric,
            limit,
            state: CheckState::new(delay),
        }
    }

    /// Metric watched
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Configured limit
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Whether a limit is configured
    pub fn is_enabled(&self) -> bool {
        self.limit.is_some()
    }

    /// State machine
    pub fn state(&self) -> &CheckState {
        &self.state
    }

    /// Evaluate one sample, appending an event on a state change
    pub fn evaluate(
        &mut self,
        name: &str,
        snapshot: &UsageSnapshot,
        templates: &TemplateSet,
        now: Instant,
        batch: &mut AlertBatch,
    ) -> Option<Edge> {
        let limit = self.limit?;
        let usage = self.metric.usage(snapshot);
        let breach = self.metric.direction().breached(usage, limit);

        let edge = self.state.observe(breach, now)?;
        log::debug!(
            "{}: {} {} (limit {}, usage {})",
            name,
            self.metric,
            edge,
            limit,
            usage
        );
        batch.push(templates.usage(self.metric, edge, name, limit, usage));
        Some(edge)
    }
}

/// Boolean expectation check
#[derive(Debug, Clone)]
pub struct StaticCheck {
    expected: Option<bool>,
    state: CheckState,
}

impl StaticCheck {
    /// The container must exist
    pub fn existence(delay: Option<Duration>) -> Self {
        Self {
            expected: Some(true),
            state: CheckState::new(delay),
        }
    }

    /// The container's running state must match `expected`, if set
    pub fn running(expected: Option<bool>, delay: Option<Duration>) -> Self {
        Self {
            expected,
            state: CheckState::new(delay),
        }
    }

    /// Expected value
    pub fn expected(&self) -> Option<bool> {
        self.expected
    }

    /// State machine
    pub fn state(&self) -> &CheckState {
        &self.state
    }

    /// Whether an alert is open
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Feed the existence outcome: `found` is false for a benign absence
    pub fn evaluate_existence(
        &mut self,
        name: &str,
        found: bool,
        templates: &TemplateSet,
        now: Instant,
        batch: &mut AlertBatch,
    ) -> Option<Edge> {
        let edge = self.state.observe(!found, now)?;
        log::debug!("{}: existence {}", name, edge);
        batch.push(templates.exist(edge, name));
        Some(edge)
    }

    /// Feed the observed running state; no-op without an expectation
    pub fn evaluate_running(
        &mut self,
        name: &str,
        observed: bool,
        templates: &TemplateSet,
        now: Instant,
        batch: &mut AlertBatch,
    ) -> Option<Edge> {
        let expected = self.expected?;
        let edge = self.state.observe(expected != observed, now)?;
        log::debug!("{}: running {} (expected {}, observed {})", name, edge, expected, observed);
        batch.push(templates.running(edge, name, expected, observed));
        Some(edge)
    }
}
