//! Service layer
//!
//! Long-running services built on the alert core.

pub mod monitor;

pub use monitor::{Monitor, MonitorConfig, StopReason};
