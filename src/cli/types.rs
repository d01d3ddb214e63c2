//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{init::InitArgs, solve::SolveArgs};

#[derive(Parser, Debug)]
#[command(name = "thicket")]
#[command(about = "Thicket - guided tree-of-thought search over a local language model", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file used instead of .thicket/config.yaml and .thicket/local.yaml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decompose a problem, search the thought tree and synthesize the best answer
    Solve(SolveArgs),

    /// Check that the oracle is reachable and list its models
    Check,

    /// Write the default configuration to .thicket/config.yaml
    Init(InitArgs),

    /// Print the effective configuration
    Config,
}
