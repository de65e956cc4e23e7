//! alertd - Docker container alert daemon
//!
//! Watches containers and sends an alert whenever a check fails or recovers.

use alertd::cli::args::{generate_completions, Cli, Commands};
use alertd::commands::{run_check, run_daemon};
use alertd::error::{AppError, ConfigError};
use clap::Parser;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still wins over the verbose flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => run_daemon(config, args),

        Commands::Check(args) => run_check(config, args),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Pass a file with --config or set ALERTD_CONFIG.");
            eprintln!("      Run 'alertd check --config FILE' to validate it.");
        }
        AppError::Config(ConfigError::Invalid(errors)) => {
            eprintln!();
            for e in errors {
                eprintln!("  - {}", e);
            }
        }
        AppError::Runtime(_) => {
            eprintln!();
            eprintln!("Hint: Check that the Docker socket is reachable, or set DOCKER_HOST.");
        }
        _ => {}
    }
}
