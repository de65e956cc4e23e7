//! alertd - Docker container alert daemon library
//!
//! Polls containers through the Docker Engine API, runs debounced checks on
//! their existence, running state and resource usage, and delivers alerts to
//! email, Slack, Pushover and Pushbullet.
//!
//! # Modules
//!
//! - [`alerts`]: Check state machines, evaluation order, batches and channels
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Container state and usage types
//! - [`error`]: Error types
//! - [`runtime`]: Container runtime abstraction layer
//! - [`services`]: Poll loop

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod runtime;
pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
