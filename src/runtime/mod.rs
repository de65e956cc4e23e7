//! Container runtime abstraction layer
//!
//! Provides a trait-based abstraction over the Docker Engine API for testability.

pub mod docker;
pub mod traits;

pub use docker::{classify_response, DockerClient, Endpoint, DEFAULT_DOCKER_HOST};
pub use traits::ContainerRuntime;
