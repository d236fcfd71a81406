//! Command-line interface definitions
//!
//! The host engine invokes one subcommand per phase, pointing at the
//! JSON documents it materialized for the step.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Two-phase object-storage cache step for workflow pipelines
#[derive(Parser)]
#[command(name = "cache-step", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Phase one: check the remote prefix, fetch on a hit, and print
    /// the result for the host to record
    Run(PhaseArgs),

    /// Phase two: push the local path on a clean prior miss
    PostRun(PhaseArgs),
}

#[derive(Args)]
pub struct PhaseArgs {
    /// Path to the step inputs JSON
    #[arg(long)]
    pub inputs: PathBuf,

    /// Path to the execution context JSON
    #[arg(long)]
    pub context: PathBuf,

    /// Transfer tool binary to invoke
    #[arg(long, env = "CACHE_STEP_TRANSFER_BIN", default_value = "ossutil")]
    pub transfer_bin: String,
}
