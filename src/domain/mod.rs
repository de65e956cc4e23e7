//! Domain models for alertd
//!
//! Plain data reported by the container runtime and the usage values derived
//! from it.

pub mod container;
pub mod usage;

pub use container::ContainerState;
pub use usage::{CpuCounters, UsageSnapshot, BYTES_PER_MB};
