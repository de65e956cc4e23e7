//! Alert system domain types
//!
//! Defines the closed set of event kinds, the fields each kind carries, and the
//! immutable alert event record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an alert state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// The check started alerting
    Failure,
    /// The check stopped alerting
    Recovery,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure => write!(f, "failure"),
            Self::Recovery => write!(f, "recovery"),
        }
    }
}

/// Usage metric watched by a metric check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// CPU usage percentage, breach when above the limit
    Cpu,
    /// Process count, breach when below the limit
    MinProcs,
    /// Memory usage in MB, breach when above the limit
    Memory,
}

impl Metric {
    /// Event kind emitted for a state change of this metric
    pub fn event_kind(self, edge: Edge) -> EventKind {
        match (self, edge) {
            (Self::Cpu, Edge::Failure) => EventKind::CpuFailure,
            (Self::Cpu, Edge::Recovery) => EventKind::CpuRecovery,
            (Self::MinProcs, Edge::Failure) => EventKind::MinProcFailure,
            (Self::MinProcs, Edge::Recovery) => EventKind::MinProcRecovery,
            (Self::Memory, Edge::Failure) => EventKind::MemoryFailure,
            (Self::Memory, Edge::Recovery) => EventKind::MemoryRecovery,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::MinProcs => write!(f, "min_procs"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Placeholder field available to templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Container name
    Name,
    /// Expected running state
    Expected,
    /// Observed running state
    Running,
    /// Configured limit
    Limit,
    /// Observed usage
    Usage,
    /// Error text
    Error,
}

impl Field {
    /// Resolve a placeholder name (`Name`, `Limit`, ...), ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Name,
            Self::Expected,
            Self::Running,
            Self::Limit,
            Self::Usage,
            Self::Error,
        ]
        .into_iter()
        .find(|field| field.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical placeholder name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Expected => "Expected",
            Self::Running => "Running",
            Self::Limit => "Limit",
            Self::Usage => "Usage",
            Self::Error => "Error",
        }
    }
}

/// Every kind of alert the daemon can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    ExistFailure,
    ExistRecovery,
    RunningFailure,
    RunningRecovery,
    CpuFailure,
    CpuRecovery,
    MinProcFailure,
    MinProcRecovery,
    MemoryFailure,
    MemoryRecovery,
    GenericError,
    Starting,
    Stopping,
}

impl EventKind {
    /// All event kinds, in declaration order
    pub const ALL: [EventKind; 13] = [
        Self::ExistFailure,
        Self::ExistRecovery,
        Self::RunningFailure,
        Self::RunningRecovery,
        Self::CpuFailure,
        Self::CpuRecovery,
        Self::MinProcFailure,
        Self::MinProcRecovery,
        Self::MemoryFailure,
        Self::MemoryRecovery,
        Self::GenericError,
        Self::Starting,
        Self::Stopping,
    ];

    /// Configuration key of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExistFailure => "exist-failure",
            Self::ExistRecovery => "exist-recovery",
            Self::RunningFailure => "running-failure",
            Self::RunningRecovery => "running-recovery",
            Self::CpuFailure => "cpu-failure",
            Self::CpuRecovery => "cpu-recovery",
            Self::MinProcFailure => "min-proc-failure",
            Self::MinProcRecovery => "min-proc-recovery",
            Self::MemoryFailure => "memory-failure",
            Self::MemoryRecovery => "memory-recovery",
            Self::GenericError => "generic-error",
            Self::Starting => "starting",
            Self::Stopping => "stopping",
        }
    }

    /// Fields a payload of this kind carries
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::ExistFailure | Self::ExistRecovery => &[Field::Name],
            Self::RunningFailure | Self::RunningRecovery => {
                &[Field::Name, Field::Expected, Field::Running]
            }
            Self::CpuFailure
            | Self::CpuRecovery
            | Self::MinProcFailure
            | Self::MinProcRecovery
            | Self::MemoryFailure
            | Self::MemoryRecovery => &[Field::Name, Field::Limit, Field::Usage],
            Self::GenericError => &[Field::Name, Field::Error],
            Self::Starting | Self::Stopping => &[],
        }
    }

    /// Title used when no override is configured
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::ExistFailure => "container existence check failed",
            Self::ExistRecovery => "container existence check recovered",
            Self::RunningFailure => "running state check failed",
            Self::RunningRecovery => "running state check recovered",
            Self::CpuFailure => "cpu check failed",
            Self::CpuRecovery => "cpu check recovered",
            Self::MinProcFailure => "minimum process check failed",
            Self::MinProcRecovery => "minimum process check recovered",
            Self::MemoryFailure => "memory check failed",
            Self::MemoryRecovery => "memory check recovered",
            Self::GenericError => "unknown error",
            Self::Starting => "alertd started",
            Self::Stopping => "alertd stopping",
        }
    }

    /// Message used when no override is configured
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ExistFailure | Self::ExistRecovery | Self::GenericError => "{{.Name}}",
            Self::RunningFailure | Self::RunningRecovery => {
                "{{.Name}}: expected running state: {{.Expected}}, current running state: {{.Running}}"
            }
            Self::CpuFailure | Self::CpuRecovery => {
                "{{.Name}}: CPU limit: {{.Limit}}, current usage: {{.Usage}}"
            }
            Self::MinProcFailure | Self::MinProcRecovery => {
                "{{.Name}}: minimum PIDs: {{.Limit}}, current PIDs: {{.Usage}}"
            }
            Self::MemoryFailure | Self::MemoryRecovery => {
                "{{.Name}}: Memory limit: {{.Limit}}, current usage: {{.Usage}}"
            }
            Self::Starting => "container monitoring started",
            Self::Stopping => "container monitoring stopped",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rendered alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Event kind this alert was rendered from
    pub kind: EventKind,
    /// Short title
    pub title: String,
    /// Message body
    pub message: String,
    /// Underlying error, if any
    pub error: Option<String>,
}

impl AlertEvent {
    /// Create an event without an error
    pub fn new(kind: EventKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            error: None,
        }
    }

    /// Attach the underlying error
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Single log line: `title - message`
    pub fn log_line(&self) -> String {
        let message = flatten(&self.message);
        if self.title.is_empty() {
            message
        } else {
            format!("{} - {}", self.title, message)
        }
    }

    /// Single-line form used by chat and push channels
    pub fn dump(&self) -> String {
        let mut line = self.log_line();
        if let Some(error) = &self.error {
            line.push_str(" - ");
            line.push_str(error);
        }
        line
    }

    /// Multi-line form used by email
    pub fn dump_email(&self) -> String {
        let mut text = String::new();
        if !self.title.is_empty() {
            text.push_str(&self.title);
            text.push('\n');
        }
        text.push_str(&self.message);
        if let Some(error) = &self.error {
            text.push('\n');
            text.push_str(error);
        }
        text
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

fn flatten(text: &str) -> String {
    text.replace('\n', " ")
}
