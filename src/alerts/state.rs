//! Debounce and hysteresis state for a single check
//!
//! A check is `Inactive`, `Delaying` (a breach is being timed against the
//! delay window) or `Active` (an alert is open). Without a delay window the
//! machine never enters `Delaying`.

use super::types::Edge;
use std::fmt;
use std::time::{Duration, Instant};

/// Current phase of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No alert open, no breach being timed
    Inactive,
    /// Breach seen at `since`, waiting for the delay window to pass
    Delaying { since: Instant },
    /// Alert open
    Active,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "INACTIVE"),
            Self::Delaying { .. } => write!(f, "DELAYING"),
            Self::Active => write!(f, "ACTIVE"),
        }
    }
}

/// Debounced edge detector for one monitored quantity
#[derive(Debug, Clone)]
pub struct CheckState {
    delay: Option<Duration>,
    phase: Phase,
}

impl CheckState {
    /// Create a state machine; a zero delay means no debounce
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay: delay.filter(|d| !d.is_zero()),
            phase: Phase::Inactive,
        }
    }

    /// Configured delay window
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether an alert is open
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Whether a breach is being timed
    pub fn is_delaying(&self) -> bool {
        matches!(self.phase, Phase::Delaying { .. })
    }

    /// Decide whether this cycle's alerting decision must be suppressed
    ///
    /// A first breach starts the delay timer; the breach is suppressed until
    /// it has persisted for the whole window. A clear resets the timer.
    pub fn gate(&mut self, breach: bool, now: Instant) -> bool {
        let Some(delay) = self.delay else {
            return false;
        };

        match (breach, self.phase) {
            (true, Phase::Inactive) => {
                self.phase = Phase::Delaying { since: now };
                true
            }
            (true, Phase::Delaying { since }) => now.saturating_duration_since(since) < delay,
            (true, Phase::Active) => false,
            (false, Phase::Delaying { .. }) => {
                self.phase = Phase::Inactive;
                false
            }
            (false, _) => false,
        }
    }

    /// Apply the edge detector after [`gate`](Self::gate)
    ///
    /// Returns the edge to report, if the alert state changed.
    pub fn decide(&mut self, breach: bool, suppressed: bool) -> Option<Edge> {
        if suppressed {
            return None;
        }

        match (breach, self.phase) {
            (true, Phase::Active) => None,
            (true, _) => {
                self.phase = Phase::Active;
                Some(Edge::Failure)
            }
            (false, Phase::Active) => {
                self.phase = Phase::Inactive;
                Some(Edge::Recovery)
            }
            (false, _) => None,
        }
    }

    /// Gate and decide in one step
    pub fn observe(&mut self, breach: bool, now: Instant) -> Option<Edge> {
        let suppressed = self.gate(breach, now);
        self.decide(breach, suppressed)
    }
}

impl Default for CheckState {
    fn default() -> Self {
        Self::new(None)
    }
}
