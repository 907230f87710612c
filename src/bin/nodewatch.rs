//! nodewatch CLI Binary
//!
//! Command-line interface for querying and watching Nomad cluster nodes.

use anyhow::Context;
use clap::Parser;
use nodewatch::cli::{load_config, map_error, Cli, RunContext};
use nodewatch::config::NodewatchConfig;
use nodewatch::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(2);
        }
    };

    if let Err(e) = init(&cli, &config) {
        eprintln!("{:#}", e);
        process::exit(1);
    }

    info!(address = %config.nomad.address, "nodewatch starting");

    let context = match RunContext::new(config, cli.format) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing client: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command).await {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

fn init(cli: &Cli, config: &NodewatchConfig) -> anyhow::Result<()> {
    let logging = build_logging_config(cli, config);
    init_logging(&logging).context("failed to initialize logging")
}

/// Logging flags override the config file, which overrides defaults.
fn build_logging_config(cli: &Cli, config: &NodewatchConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }
    logging
}
