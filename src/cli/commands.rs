//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: start the fleet scheduler for one daily run
//! - seed: mark every roster account alive in the health store
//! - health: show each account's latest outcome and eligibility
//! - validate: check config and roster without running

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flockr - fleet posting scheduler with liveness tracking
#[derive(Parser, Debug)]
#[command(name = "flockr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler until the daily target is met
    Run {
        /// Log posts instead of publishing them (required until a
        /// publisher integration is configured)
        #[arg(long)]
        dry_run: bool,
    },

    /// Seed a success record for every roster account
    Seed,

    /// Show latest outcome and eligibility per account
    Health,

    /// Validate config and roster, then exit
    Validate,
}
