//! Alert templates
//!
//! Every [`EventKind`] has a title and a message template. Templates use
//! `{{.Field}}` placeholders and are checked against the fields of their kind
//! when the set is built, so rendering itself cannot fail.

use super::types::{AlertEvent, Edge, EventKind, Field, Metric};
use crate::error::TemplateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which half of an alert a template renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Title,
    Message,
}

impl Part {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Message => "message",
        }
    }
}

/// User override for one event kind; unset parts keep their default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOverride {
    pub title: Option<String>,
    pub message: Option<String>,
}

/// Template overrides keyed by event kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TemplatesConfig {
    pub exist_failure: Option<TemplateOverride>,
    pub exist_recovery: Option<TemplateOverride>,
    pub running_failure: Option<TemplateOverride>,
    pub running_recovery: Option<TemplateOverride>,
    pub cpu_failure: Option<TemplateOverride>,
    pub cpu_recovery: Option<TemplateOverride>,
    pub min_proc_failure: Option<TemplateOverride>,
    pub min_proc_recovery: Option<TemplateOverride>,
    pub memory_failure: Option<TemplateOverride>,
    pub memory_recovery: Option<TemplateOverride>,
    pub generic_error: Option<TemplateOverride>,
    pub starting: Option<TemplateOverride>,
    pub stopping: Option<TemplateOverride>,
}

impl TemplatesConfig {
    /// Override configured for a kind
    pub fn get(&self, kind: EventKind) -> Option<&TemplateOverride> {
        match kind {
            EventKind::ExistFailure => self.exist_failure.as_ref(),
            EventKind::ExistRecovery => self.exist_recovery.as_ref(),
            EventKind::RunningFailure => self.running_failure.as_ref(),
            EventKind::RunningRecovery => self.running_recovery.as_ref(),
            EventKind::CpuFailure => self.cpu_failure.as_ref(),
            EventKind::CpuRecovery => self.cpu_recovery.as_ref(),
            EventKind::MinProcFailure => self.min_proc_failure.as_ref(),
            EventKind::MinProcRecovery => self.min_proc_recovery.as_ref(),
            EventKind::MemoryFailure => self.memory_failure.as_ref(),
            EventKind::MemoryRecovery => self.memory_recovery.as_ref(),
            EventKind::GenericError => self.generic_error.as_ref(),
            EventKind::Starting => self.starting.as_ref(),
            EventKind::Stopping => self.stopping.as_ref(),
        }
    }

    /// Kinds with at least one overridden part
    pub fn overridden(&self) -> Vec<EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(|kind| {
                self.get(*kind)
                    .map(|o| o.title.is_some() || o.message.is_some())
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// Structured values substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    Empty,
    Name {
        name: &'a str,
    },
    Running {
        name: &'a str,
        expected: bool,
        observed: bool,
    },
    Usage {
        name: &'a str,
        limit: u64,
        usage: u64,
    },
    Error {
        name: &'a str,
        error: &'a str,
    },
}

impl Payload<'_> {
    fn value(&self, field: Field) -> Option<String> {
        match (self, field) {
            (Self::Name { name }, Field::Name)
            | (Self::Running { name, .. }, Field::Name)
            | (Self::Usage { name, .. }, Field::Name)
            | (Self::Error { name, .. }, Field::Name) => Some(name.to_string()),
            (Self::Running { expected, .. }, Field::Expected) => Some(expected.to_string()),
            (Self::Running { observed, .. }, Field::Running) => Some(observed.to_string()),
            (Self::Usage { limit, .. }, Field::Limit) => Some(limit.to_string()),
            (Self::Usage { usage, .. }, Field::Usage) => Some(usage.to_string()),
            (Self::Error { error, .. }, Field::Error) => Some(error.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template for one part of an event kind
    pub fn parse(source: &str, kind: EventKind, part: Part) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| TemplateError::Unterminated {
                kind: kind.to_string(),
                part: part.as_str().to_string(),
            })?;

            let inner = after[..end].trim();
            let name = inner.strip_prefix('.').unwrap_or(inner).trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyField {
                    kind: kind.to_string(),
                    part: part.as_str().to_string(),
                });
            }

            let field = Field::from_name(name)
                .filter(|field| kind.fields().contains(field))
                .ok_or_else(|| TemplateError::UnknownField {
                    kind: kind.to_string(),
                    part: part.as_str().to_string(),
                    field: name.to_string(),
                })?;

            segments.push(Segment::Field(field));
            rest = &after[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Template that renders its source verbatim
    pub fn literal(text: &str) -> Self {
        Self {
            segments: vec![Segment::Text(text.to_string())],
        }
    }

    /// Render with the given payload
    pub fn render(&self, payload: &Payload<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(field) => {
                    if let Some(value) = payload.value(*field) {
                        out.push_str(&value);
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
struct KindTemplates {
    title: Template,
    message: Template,
}

/// Validated templates for every event kind
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: BTreeMap<EventKind, KindTemplates>,
}

impl TemplateSet {
    /// Build the set, applying overrides over the defaults
    ///
    /// Returns every parse failure, not just the first.
    pub fn build(overrides: &TemplatesConfig) -> Result<Self, Vec<TemplateError>> {
        let mut templates = BTreeMap::new();
        let mut errors = Vec::new();

        for kind in EventKind::ALL {
            let custom = overrides.get(kind);
            let title_source = custom
                .and_then(|o| o.title.as_deref())
                .unwrap_or(kind.default_title());
            let message_source = custom
                .and_then(|o| o.message.as_deref())
                .unwrap_or(kind.default_message());

            let title = Template::parse(title_source, kind, Part::Title);
            let message = Template::parse(message_source, kind, Part::Message);

            match (title, message) {
                (Ok(title), Ok(message)) => {
                    templates.insert(kind, KindTemplates { title, message });
                }
                (title, message) => {
                    errors.extend(title.err());
                    errors.extend(message.err());
                }
            }
        }

        if errors.is_empty() {
            Ok(Self { templates })
        } else {
            Err(errors)
        }
    }

    /// Default templates for every kind
    pub fn defaults() -> Self {
        let templates = EventKind::ALL
            .into_iter()
            .map(|kind| {
                let title = Template::parse(kind.default_title(), kind, Part::Title)
                    .unwrap_or_else(|_| Template::literal(kind.default_title()));
                let message = Template::parse(kind.default_message(), kind, Part::Message)
                    .unwrap_or_else(|_| Template::literal(kind.default_message()));
                (kind, KindTemplates { title, message })
            })
            .collect();

        Self { templates }
    }

    /// Render an event of `kind` from `payload`
    pub fn render(&self, kind: EventKind, payload: &Payload<'_>) -> AlertEvent {
        match self.templates.get(&kind) {
            Some(t) => AlertEvent::new(kind, t.title.render(payload), t.message.render(payload)),
            None => AlertEvent::new(kind, kind.default_title(), ""),
        }
    }

    /// Existence check state change
    pub fn exist(&self, edge: Edge, name: &str) -> AlertEvent {
        let kind = match edge {
            Edge::Failure => EventKind::ExistFailure,
            Edge::Recovery => EventKind::ExistRecovery,
        };
        self.render(kind, &Payload::Name { name })
    }

    /// Running state check change
    pub fn running(&self, edge: Edge, name: &str, expected: bool, observed: bool) -> AlertEvent {
        let kind = match edge {
            Edge::Failure => EventKind::RunningFailure,
            Edge::Recovery => EventKind::RunningRecovery,
        };
        self.render(
            kind,
            &Payload::Running {
                name,
                expected,
                observed,
            },
        )
    }

    /// Metric check state change
    pub fn usage(&self, metric: Metric, edge: Edge, name: &str, limit: u64, usage: u64) -> AlertEvent {
        self.render(
            metric.event_kind(edge),
            &Payload::Usage { name, limit, usage },
        )
    }

    /// Communication failure with the runtime
    pub fn generic_error(&self, name: &str, error: &str) -> AlertEvent {
        self.render(EventKind::GenericError, &Payload::Error { name, error })
            .with_error(error)
    }

    /// Daemon start notice
    pub fn starting(&self) -> AlertEvent {
        self.render(EventKind::Starting, &Payload::Empty)
    }

    /// Daemon stop notice
    pub fn stopping(&self) -> AlertEvent {
        self.render(EventKind::Stopping, &Payload::Empty)
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::defaults()
    }
}
