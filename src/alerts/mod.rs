//! Alert and notification system
//!
//! Debounced per-check state machines, per-container evaluation order,
//! alert batches, templates, and the notification channels batches are
//! delivered through.

pub mod batch;
pub mod channels;
pub mod check;
pub mod evaluator;
pub mod notifier;
pub mod state;
pub mod template;
pub mod types;

pub use batch::AlertBatch;
pub use channels::ChannelSettings;
pub use check::{Direction, MetricCheck, StaticCheck};
pub use evaluator::{CycleOutcome, Existence, MonitoredContainer};
pub use notifier::{DispatchReport, NotificationManager, Notifier};
pub use state::{CheckState, Phase};
pub use template::{Part, Payload, Template, TemplateOverride, TemplateSet, TemplatesConfig};
pub use types::{AlertEvent, Edge, EventKind, Field, Metric};
