//! Check command implementation
//!
//! Validates the configuration without touching Docker and prints what would
//! be monitored.

use crate::cli::args::CheckArgs;
use crate::cli::output::{print_output, ConfigSummary};
use crate::config::ConfigBuilder;
use crate::error::Result;

use std::path::Path;

/// Execute the check command
pub fn run_check(config_path: Option<&Path>, args: &CheckArgs) -> Result<()> {
    let builder = ConfigBuilder::new().with_file(config_path)?;
    let source = builder.source().map(|p| p.display().to_string());
    let config = builder.build();

    config.validate()?;

    let summary = ConfigSummary::new(&config, source);
    print_output(&summary, args.format)?;
    Ok(())
}
