//! CLI command definitions for the `orchestra` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod cards;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Simulate a team of agents planning a product launch.
#[derive(Parser)]
#[command(name = "orchestra", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress progress output and agent transcripts.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export plan spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Config file to use instead of ~/.orchestra/config.toml.
    #[arg(long, global = true, env = "ORCHESTRA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one coordinated plan for a region and product.
    Run(run::RunArgs),

    /// Discover the specialist agents and list their cards.
    Cards,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
