//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub use types::{Cli, Commands};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Dispatch the subcommand.
///
/// `init` runs before any configuration is read so that it can repair a
/// broken project file with `--force`.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Solve(args) => {
            let (config, _logger) = prepare(cli.config.as_deref(), cli.verbose)?;
            commands::solve::execute(args, config, cli.json).await
        }
        Commands::Check => {
            let (config, _logger) = prepare(cli.config.as_deref(), cli.verbose)?;
            commands::check::execute(&config, cli.json).await
        }
        Commands::Config => {
            let (config, _logger) = prepare(cli.config.as_deref(), cli.verbose)?;
            commands::config::execute(config, cli.json)
        }
    }
}

/// Load configuration and install logging. The logger must outlive the
/// command so buffered file output is flushed.
fn prepare(config_path: Option<&Path>, verbose: bool) -> Result<(Config, LoggerImpl)> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let log_config = LogConfig::try_from(&config.logging)
        .context("Invalid logging configuration")?
        .verbose(verbose);
    let logger = LoggerImpl::init(&log_config)?;
    Ok((config, logger))
}

/// Print `err` with its cause chain and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", style("error:").red().bold());
    }
    std::process::exit(1)
}
