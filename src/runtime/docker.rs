//! Docker Engine API client
//!
//! Wraps `bollard` behind a blocking [`ContainerRuntime`]. Reaches the daemon
//! over its Unix socket (`unix://`) or plain HTTP (`tcp://`, `http://`).

use crate::domain::{ContainerState, CpuCounters, UsageSnapshot};
use crate::error::{RuntimeError, NOT_FOUND_SIGNATURE};
use crate::runtime::traits::ContainerRuntime;

use bollard::container::{InspectContainerOptions, Stats, StatsOptions};
use bollard::errors::Error as BollardError;
use bollard::{Docker, API_DEFAULT_VERSION};
use futures_util::TryStreamExt;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Host used when neither the configuration nor `DOCKER_HOST` names one
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Where the Docker daemon listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Path of a Unix domain socket
    Unix(String),
    /// `host:port` of a plain HTTP listener
    Http(String),
}

impl Endpoint {
    /// Parse a docker host string
    ///
    /// Accepts `unix:///path`, `tcp://host:port` and `http://host:port`.
    pub fn parse(host: &str) -> Option<Self> {
        let host = host.trim();
        if let Some(path) = host.strip_prefix("unix://") {
            return (!path.is_empty()).then(|| Self::Unix(path.to_string()));
        }

        let addr = host
            .strip_prefix("tcp://")
            .or_else(|| host.strip_prefix("http://"))?
            .trim_end_matches('/');
        (!addr.is_empty()).then(|| Self::Http(addr.to_string()))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", path),
            Self::Http(addr) => write!(f, "http://{}", addr),
        }
    }
}

/// Blocking Docker Engine API client
pub struct DockerClient {
    docker: Docker,
    endpoint: Endpoint,
    runtime: Runtime,
}

impl DockerClient {
    /// Create a client for the given host
    pub fn new(host: &str, timeout: Duration) -> Result<Self, RuntimeError> {
        let endpoint = Endpoint::parse(host).ok_or_else(|| {
            RuntimeError::Transport(format!("unsupported docker host '{}'", host))
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;

        let docker = {
            let _guard = runtime.enter();
            let secs = timeout.as_secs().max(1);
            let connected = match &endpoint {
                Endpoint::Unix(path) => Docker::connect_with_unix(path, secs, API_DEFAULT_VERSION),
                Endpoint::Http(addr) => Docker::connect_with_http(addr, secs, API_DEFAULT_VERSION),
            };
            connected.map_err(runtime_error)?
        };

        Ok(Self {
            docker,
            endpoint,
            runtime,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl ContainerRuntime for DockerClient {
    fn inspect(&self, name: &str) -> Result<ContainerState, RuntimeError> {
        log::debug!("inspect {} via {}", name, self.endpoint);

        let response = self
            .runtime
            .block_on(
                self.docker
                    .inspect_container(name, None::<InspectContainerOptions>),
            )
            .map_err(runtime_error)?;

        let state = response.state.unwrap_or_default();
        Ok(ContainerState {
            running: state.running.unwrap_or(false),
            status: state
                .status
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty()),
        })
    }

    fn stats(&self, name: &str) -> Result<UsageSnapshot, RuntimeError> {
        log::debug!("stats {} via {}", name, self.endpoint);

        let options = StatsOptions {
            stream: false,
            one_shot: false,
        };
        let stats = self
            .runtime
            .block_on(async {
                let mut stream = Box::pin(self.docker.stats(name, Some(options)));
                stream.try_next().await
            })
            .map_err(runtime_error)?
            .ok_or_else(|| RuntimeError::Decode("empty stats response".to_string()))?;

        Ok(snapshot(&stats))
    }
}

fn snapshot(stats: &Stats) -> UsageSnapshot {
    UsageSnapshot {
        cpu: CpuCounters::new(
            stats.cpu_stats.cpu_usage.total_usage,
            stats.cpu_stats.system_cpu_usage.unwrap_or(0),
        ),
        precpu: CpuCounters::new(
            stats.precpu_stats.cpu_usage.total_usage,
            stats.precpu_stats.system_cpu_usage.unwrap_or(0),
        ),
        memory_bytes: stats.memory_stats.usage.unwrap_or(0),
        pids: stats.pids_stats.current.unwrap_or(0),
    }
}

fn runtime_error(err: BollardError) -> RuntimeError {
    match err {
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => classify_response(status_code, message),
        other => RuntimeError::Transport(other.to_string()),
    }
}

/// Map an error answer from the daemon
///
/// Only the daemon's own "No such container:" message means absence. A bare
/// 404 from anything else at that address is a communication failure.
pub fn classify_response(status: u16, message: String) -> RuntimeError {
    if message.contains(NOT_FOUND_SIGNATURE) {
        RuntimeError::NotFound(message)
    } else {
        RuntimeError::Api { status, message }
    }
}
