//! mirror-move CLI Binary
//!
//! Command-line interface for scanning content-hash maps and reconciling a
//! directory layout against a target map.

use clap::Parser;
use mirror_move::cli::{Cli, RunContext};
use mirror_move::config::ConfigLoader;
use mirror_move::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("mirror-move starting");

    let context = match RunContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", mirror_move::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", mirror_move::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::load(cli.config.as_deref())
        .unwrap_or_else(|_| ConfigLoader::defaults())
        .logging;

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
