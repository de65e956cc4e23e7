//! Container lifecycle domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state reported by the runtime for an existing container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    /// Whether the container's main process is running
    pub running: bool,
    /// Runtime status string ("running", "exited", ...)
    pub status: Option<String>,
}

impl ContainerState {
    /// State of a running container
    pub fn running() -> Self {
        Self {
            running: true,
            status: Some("running".to_string()),
        }
    }

    /// State of a stopped container
    pub fn stopped() -> Self {
        Self {
            running: false,
            status: Some("exited".to_string()),
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{}", status),
            None if self.running => write!(f, "running"),
            None => write!(f, "stopped"),
        }
    }
}
