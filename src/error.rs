//! Unified error types for alertd
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error talking to the container runtime
    #[error("Container runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from template parsing
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Error delivering a notification
    #[error("Notification error: {0}")]
    Channel(#[from] ChannelError),

    /// Failed to install the shutdown signal handler
    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the container runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The runtime does not know the container
    #[error("{0}")]
    NotFound(String),

    /// The runtime could not be reached
    #[error("Failed to reach container runtime: {0}")]
    Transport(String),

    /// The runtime answered with an error status
    #[error("Container runtime returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The runtime answered with a body we could not decode
    #[error("Failed to decode runtime response: {0}")]
    Decode(String),
}

/// Message fragment the Docker daemon uses for unknown containers
pub const NOT_FOUND_SIGNATURE: &str = "No such container:";

impl RuntimeError {
    /// Whether this error means the container does not exist
    ///
    /// Any other error is a communication failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(message)
            | Self::Transport(message)
            | Self::Decode(message)
            | Self::Api { message, .. } => message.contains(NOT_FOUND_SIGNATURE),
        }
    }
}

/// Errors from alert template parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{` without its closing `}}`
    #[error("{kind} {part} template: unterminated placeholder")]
    Unterminated { kind: String, part: String },

    /// A placeholder naming a field the event does not carry
    #[error("{kind} {part} template: unknown field '{field}'")]
    UnknownField {
        kind: String,
        part: String,
        field: String,
    },

    /// `{{ }}` with nothing inside
    #[error("{kind} {part} template: empty placeholder")]
    EmptyField { kind: String, part: String },
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// No containers to monitor
    #[error("No containers configured")]
    NoContainers,

    /// Channel configured partially
    #[error("{channel} settings validation failed: missing {}", .missing.join(", "))]
    IncompleteChannel {
        channel: String,
        missing: Vec<String>,
    },

    /// Template override failed to parse
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Several problems found at once
    #[error("Configuration validation failed: {}", join_errors(.0))]
    Invalid(Vec<ConfigError>),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from notification channels
#[derive(Error, Debug)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint rejected the notification
    #[error("{channel} responded with status {status}")]
    Status { channel: String, status: u16 },

    /// SMTP delivery failed
    #[error("Error sending email: {0}")]
    Smtp(String),

    /// Malformed email address or message
    #[error("Invalid email message: {0}")]
    Address(String),

    /// Delivery did not finish in time
    #[error("{0} did not finish before the dispatch deadline")]
    Timeout(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
