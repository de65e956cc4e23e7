//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod run;

pub use check::run_check;
pub use run::run_daemon;
