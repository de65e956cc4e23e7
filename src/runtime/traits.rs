//! Trait definitions for container runtime access
//!
//! These traits abstract over the Docker Engine API to enable testing with mocks.

use crate::domain::{ContainerState, UsageSnapshot};
use crate::error::RuntimeError;

/// Read-only access to a container runtime
///
/// Both calls are blocking. Errors from `inspect` are classified by the
/// evaluator with [`RuntimeError::is_not_found`].
pub trait ContainerRuntime: Send + Sync {
    /// Look up a container by name and report its lifecycle state
    fn inspect(&self, name: &str) -> Result<ContainerState, RuntimeError>;

    /// Take one usage sample for a container
    fn stats(&self, name: &str) -> Result<UsageSnapshot, RuntimeError>;
}

impl<R: ContainerRuntime + ?Sized> ContainerRuntime for &R {
    fn inspect(&self, name: &str) -> Result<ContainerState, RuntimeError> {
        (**self).inspect(name)
    }

    fn stats(&self, name: &str) -> Result<UsageSnapshot, RuntimeError> {
        (**self).stats(name)
    }
}
