//! Per-cycle alert accumulation
//!
//! An [`AlertBatch`] collects the events emitted during one poll cycle, either
//! for one container or for the whole fleet, and renders them for the log and
//! for the notification channels.

use super::types::AlertEvent;
use serde::{Deserialize, Serialize};

/// Ordered list of alert events; insertion order is emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertBatch {
    events: Vec<AlertEvent>,
}

impl AlertBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Append one event
    pub fn push(&mut self, event: AlertEvent) {
        self.events.push(event);
    }

    /// Whether there is anything to send
    pub fn has_pending(&self) -> bool {
        !self.events.is_empty()
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in emission order
    pub fn events(&self) -> &[AlertEvent] {
        &self.events
    }

    /// Append the events of each batch, in argument order
    pub fn concat<'a, I>(&mut self, batches: I)
    where
        I: IntoIterator<Item = &'a AlertBatch>,
    {
        for batch in batches {
            self.events.extend(batch.events.iter().cloned());
        }
    }

    /// Write the batch to the process log
    pub fn log(&self) {
        log::warn!("ALERT:");
        for event in &self.events {
            log::warn!("{}", event.log_line());
        }
    }

    /// Single-string payload for chat and push channels
    pub fn dump(&self) -> String {
        self.events
            .iter()
            .map(|e| format!("{}\n\n", e.dump()))
            .collect()
    }

    /// Email body: one block per event separated by blank lines
    pub fn dump_email(&self) -> String {
        self.events
            .iter()
            .map(|e| format!("{}\n\n", e.dump_email()))
            .collect()
    }

    /// All messages joined with spaces
    pub fn messages(&self) -> String {
        self.join(|e| e.message.as_str())
    }

    /// All non-empty titles joined with spaces
    pub fn titles(&self) -> String {
        self.join(|e| e.title.as_str())
    }

    fn join<'a>(&'a self, part: impl Fn(&'a AlertEvent) -> &'a str) -> String {
        self.events
            .iter()
            .map(part)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Vec<AlertEvent>> for AlertBatch {
    fn from(events: Vec<AlertEvent>) -> Self {
        Self { events }
    }
}

impl<'a> IntoIterator for &'a AlertBatch {
    type Item = &'a AlertEvent;
    type IntoIter = std::slice::Iter<'a, AlertEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
