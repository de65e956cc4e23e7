//! Alert notification system
//!
//! Defines the channel trait and the manager that fans a batch out to every
//! configured channel.

use super::batch::AlertBatch;
use crate::error::ChannelError;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Notification channel trait
pub trait Notifier: Send + Sync {
    /// Deliver a batch of alerts
    fn notify(&self, batch: &AlertBatch) -> Result<(), ChannelError>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

/// Result of one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Channels that accepted the batch
    pub delivered: Vec<String>,
    /// Channels that failed, with the error text
    pub failed: Vec<(String, String)>,
    /// Channels still sending when the timeout expired
    pub timed_out: Vec<String>,
}

impl DispatchReport {
    /// Whether every channel accepted the batch
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty() && self.timed_out.is_empty()
    }

    /// Number of channels that were attempted
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len() + self.timed_out.len()
    }
}

/// Notification manager
///
/// Sends each batch to every channel on its own thread, then waits for the
/// results up to a deadline.
pub struct NotificationManager {
    notifiers: Vec<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl NotificationManager {
    /// Create a manager with no channels
    pub fn new(timeout: Duration) -> Self {
        Self {
            notifiers: Vec::new(),
            timeout,
        }
    }

    /// Add a notifier
    pub fn add_notifier(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Get number of configured notifiers
    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    /// Names of the configured notifiers
    pub fn names(&self) -> Vec<String> {
        self.notifiers.iter().map(|n| n.name().to_string()).collect()
    }

    /// Default wait for a dispatch
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Log the batch and send it to every channel
    pub fn dispatch(&self, batch: &AlertBatch) -> DispatchReport {
        self.dispatch_within(batch, self.timeout)
    }

    /// Like [`dispatch`](Self::dispatch) with an explicit deadline
    ///
    /// An empty batch is neither logged nor sent. Sends still running at the
    /// deadline keep going in the background and are reported as timed out.
    pub fn dispatch_within(&self, batch: &AlertBatch, timeout: Duration) -> DispatchReport {
        let mut report = DispatchReport::default();
        if !batch.has_pending() {
            return report;
        }

        batch.log();

        if self.notifiers.is_empty() {
            return report;
        }

        let shared = Arc::new(batch.clone());
        let (tx, rx) = mpsc::channel();
        let mut pending: Vec<String> = Vec::with_capacity(self.notifiers.len());

        for notifier in &self.notifiers {
            let name = notifier.name().to_string();
            let notifier = Arc::clone(notifier);
            let batch = Arc::clone(&shared);
            let tx = tx.clone();

            let spawned = thread::Builder::new()
                .name(format!("notify-{}", name))
                .spawn(move || {
                    let result = notifier.notify(&batch);
                    let _ = tx.send((notifier.name().to_string(), result));
                });

            match spawned {
                Ok(_) => pending.push(name),
                Err(e) => {
                    log::error!("Failed to start {} notification: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }
        drop(tx);

        let deadline = Instant::now() + timeout;
        while !pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Ok((name, result)) = rx.recv_timeout(remaining) else {
                break;
            };

            if let Some(pos) = pending.iter().position(|p| *p == name) {
                pending.remove(pos);
            }

            match result {
                Ok(()) => {
                    log::debug!("Notification sent via {}", name);
                    report.delivered.push(name);
                }
                Err(e) => {
                    log::error!("Failed to notify via {}: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        for name in pending {
            log::warn!("{} (waited {:?})", ChannelError::Timeout(name.clone()), timeout);
            report.timed_out.push(name);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{AlertEvent, EventKind};
    use crate::mock::{FailingNotifier, RecordingNotifier, SlowNotifier};

    fn batch() -> AlertBatch {
        AlertBatch::from(vec![AlertEvent::new(
            EventKind::CpuFailure,
            "cpu check failed",
            "web: CPU limit: 80, current usage: 85",
        )])
    }

    #[test]
    fn test_notification_manager_creation() {
        let manager = NotificationManager::new(Duration::from_secs(1));
        assert_eq!(manager.notifier_count(), 0);
        assert_eq!(manager.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_empty_batch_is_not_sent() {
        let recorder = Arc::new(RecordingNotifier::new("slack"));
        let mut manager = NotificationManager::new(Duration::from_secs(1));
        manager.add_notifier(recorder.clone());

        let report = manager.dispatch(&AlertBatch::new());
        assert_eq!(report.attempted(), 0);
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn test_dispatch_reaches_every_channel() {
        let first = Arc::new(RecordingNotifier::new("slack"));
        let second = Arc::new(RecordingNotifier::new("email"));
        let mut manager = NotificationManager::new(Duration::from_secs(5));
        manager.add_notifier(first.clone());
        manager.add_notifier(second.clone());

        let report = manager.dispatch(&batch());
        assert!(report.all_delivered());
        assert_eq!(report.delivered.len(), 2);
        assert_eq!(first.count(), 1);
        assert_eq!(second.batches()[0], batch());
        assert_eq!(manager.names(), vec!["slack", "email"]);
    }

    #[test]
    fn test_failing_channel_does_not_block_others() {
        let recorder = Arc::new(RecordingNotifier::new("slack"));
        let mut manager = NotificationManager::new(Duration::from_secs(5));
        manager.add_notifier(Arc::new(FailingNotifier::new("email")));
        manager.add_notifier(recorder.clone());

        let report = manager.dispatch(&batch());
        assert_eq!(report.delivered, vec!["slack".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "email");
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_slow_channel_times_out() {
        let recorder = Arc::new(RecordingNotifier::new("slack"));
        let mut manager = NotificationManager::new(Duration::from_secs(5));
        manager.add_notifier(Arc::new(SlowNotifier::new(
            "pushover",
            Duration::from_secs(2),
        )));
        manager.add_notifier(recorder.clone());

        let started = Instant::now();
        let report = manager.dispatch_within(&batch(), Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(report.timed_out, vec!["pushover".to_string()]);
        assert_eq!(report.delivered, vec!["slack".to_string()]);
    }
}
