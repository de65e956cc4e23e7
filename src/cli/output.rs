//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::channels;
use crate::cli::args::OutputFormat;
use crate::config::{Config, ContainerConfig};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
            writeln!(handle, "{}", json)?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;
}

/// One monitored container
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,
    pub checks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<u64>,
}

impl From<&ContainerConfig> for ContainerSummary {
    fn from(container: &ContainerConfig) -> Self {
        let mut checks = vec!["exists".to_string()];
        if let Some(expected) = container.expected_running {
            checks.push(format!("running={}", expected));
        }
        if let Some(cpu) = container.max_cpu {
            checks.push(format!("cpu<={}%", cpu));
        }
        if let Some(procs) = container.min_procs {
            checks.push(format!("procs>={}", procs));
        }
        if let Some(mem) = container.max_mem {
            checks.push(format!("mem<={}MB", mem));
        }

        Self {
            name: container.name.clone(),
            checks,
            delay_seconds: container.delay().map(|d| d.as_secs()),
        }
    }
}

impl TableDisplay for ContainerSummary {
    fn to_table(&self) -> String {
        let mut line = format!("  {:<24} {}", self.name, self.checks.join(", "));
        if let Some(delay) = self.delay_seconds {
            line.push_str(&format!(" (delay {}s)", delay));
        }
        line
    }
}

/// Validated configuration overview
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub docker_host: String,
    pub interval_millis: u64,
    pub iterations: u64,
    pub containers: Vec<ContainerSummary>,
    pub channels: Vec<String>,
    pub template_overrides: Vec<String>,
}

impl ConfigSummary {
    /// Summarise a configuration
    pub fn new(config: &Config, source: Option<String>) -> Self {
        Self {
            source,
            docker_host: config.general.docker_host(),
            interval_millis: config.general.interval_millis,
            iterations: config.general.iterations,
            containers: config.containers.iter().map(ContainerSummary::from).collect(),
            channels: channels::active_names(config)
                .into_iter()
                .map(String::from)
                .collect(),
            template_overrides: config
                .templates
                .overridden()
                .into_iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl TableDisplay for ConfigSummary {
    fn to_table(&self) -> String {
        let mut output = String::new();
        if let Some(source) = &self.source {
            output.push_str(&format!("Config:     {}\n", source));
        }
        output.push_str(&format!("Docker:     {}\n", self.docker_host));
        output.push_str(&format!("Interval:   {}ms\n", self.interval_millis));
        let iterations = if self.iterations == 0 {
            "until stopped".to_string()
        } else {
            self.iterations.to_string()
        };
        output.push_str(&format!("Iterations: {}\n", iterations));

        output.push_str(&format!("\nContainers ({}):\n", self.containers.len()));
        for container in &self.containers {
            output.push_str(&container.to_table());
            output.push('\n');
        }

        let channels = if self.channels.is_empty() {
            "none (alerts are only logged)".to_string()
        } else {
            self.channels.join(", ")
        };
        output.push_str(&format!("\nChannels:   {}\n", channels));

        if !self.template_overrides.is_empty() {
            output.push_str(&format!(
                "Templates:  {}\n",
                self.template_overrides.join(", ")
            ));
        }

        output
    }
}
