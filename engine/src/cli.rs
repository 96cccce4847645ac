//! CLI interface for sweepd
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for the coordination daemon.

use clap::{Parser, Subcommand};
use sdk::types::CleaningMode;
use std::path::PathBuf;

/// Sweepd zone-cleaning coordinator
///
/// Groups rapid-fire "clean zone X" requests into batched jobs and drives a
/// single vacuum robot through Home Assistant.
#[derive(Parser, Debug)]
#[command(name = "sweepd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the coordinator in the foreground
    Start,

    /// Validate the configuration and exit
    Check,

    /// List configured zones
    Zones,

    /// Queue one or more zones and dispatch a single combined job
    Clean {
        /// Zones to clean, in request order
        #[arg(required = true)]
        zones: Vec<String>,

        /// Override the cleaning mode for every requested zone
        /// (sweeping, sweeping_and_mopping, routine_cleaning, deep_cleaning)
        #[arg(long, value_name = "MODE")]
        mode: Option<CleaningMode>,
    },
}
