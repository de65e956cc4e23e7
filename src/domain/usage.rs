//! Resource usage domain types
//!
//! Raw usage counters as reported by the runtime, plus the derived values the
//! metric checks compare against their limits.

use serde::{Deserialize, Serialize};

/// Bytes per megabyte used for memory limits (decimal, not MiB)
pub const BYTES_PER_MB: u64 = 1_000_000;

/// Cumulative CPU counters at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuCounters {
    /// Total CPU time consumed by the container
    pub total_usage: u64,
    /// Total CPU time of the host
    pub system_usage: u64,
}

impl CpuCounters {
    /// Create counters from raw values
    pub const fn new(total_usage: u64, system_usage: u64) -> Self {
        Self {
            total_usage,
            system_usage,
        }
    }
}

/// One usage sample for a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Counters at sample time
    pub cpu: CpuCounters,
    /// Counters at the previous sample
    pub precpu: CpuCounters,
    /// Memory usage in bytes
    pub memory_bytes: u64,
    /// Number of processes in the container
    pub pids: u64,
}

impl UsageSnapshot {
    /// CPU usage percentage between the two counter samples, truncated
    ///
    /// Returns 0 when the host counter did not advance.
    pub fn cpu_percent(&self) -> u64 {
        let total = self.cpu.total_usage as f64 - self.precpu.total_usage as f64;
        let system = self.cpu.system_usage as f64 - self.precpu.system_usage as f64;

        if system <= 0.0 || total <= 0.0 {
            return 0;
        }

        (total / system * 100.0) as u64
    }

    /// Memory usage in megabytes, truncated
    pub fn memory_mb(&self) -> u64 {
        self.memory_bytes / BYTES_PER_MB
    }

    /// Current process count
    pub fn process_count(&self) -> u64 {
        self.pids
    }

    /// Builder: CPU counters yielding the given percentage
    ///
    /// The container delta sits half a percent above `percent` so the
    /// truncated result is exact.
    pub fn with_cpu_percent(mut self, percent: u64) -> Self {
        self.precpu = CpuCounters::new(0, 0);
        self.cpu = CpuCounters::new(percent * 10_000 + 5_000, 1_000_000);
        self
    }

    /// Builder: memory usage in megabytes
    pub fn with_memory_mb(mut self, mb: u64) -> Self {
        self.memory_bytes = mb * BYTES_PER_MB;
        self
    }

    /// Builder: process count
    pub fn with_pids(mut self, pids: u64) -> Self {
        self.pids = pids;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_percent() {
        let snapshot = UsageSnapshot {
            cpu: CpuCounters::new(1_850, 12_000),
            precpu: CpuCounters::new(1_000, 11_000),
            ..Default::default()
        };
        // 850 / 1000 * 100 = 85
        assert_eq!(snapshot.cpu_percent(), 85);
    }

    #[test]
    fn test_cpu_percent_truncates() {
        let snapshot = UsageSnapshot {
            cpu: CpuCounters::new(2, 3),
            precpu: CpuCounters::new(0, 0),
            ..Default::default()
        };
        assert_eq!(snapshot.cpu_percent(), 66);
    }

    #[test]
    fn test_cpu_percent_without_system_delta() {
        let snapshot = UsageSnapshot {
            cpu: CpuCounters::new(500, 1_000),
            precpu: CpuCounters::new(100, 1_000),
            ..Default::default()
        };
        assert_eq!(snapshot.cpu_percent(), 0);
    }

    #[test]
    fn test_memory_mb_is_decimal() {
        let snapshot = UsageSnapshot {
            memory_bytes: 600_999_999,
            ..Default::default()
        };
        assert_eq!(snapshot.memory_mb(), 600);
    }

    #[test]
    fn test_builders() {
        let snapshot = UsageSnapshot::default()
            .with_cpu_percent(85)
            .with_memory_mb(600)
            .with_pids(3);
        assert_eq!(snapshot.cpu_percent(), 85);
        assert_eq!(UsageSnapshot::default().with_cpu_percent(29).cpu_percent(), 29);
        assert_eq!(snapshot.memory_mb(), 600);
        assert_eq!(snapshot.process_count(), 3);
    }
}
