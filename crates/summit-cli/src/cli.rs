//! CLI argument definitions for summit.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "summit")]
#[command(about = "Celeste death and room tracker", version)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config.json", global = true)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Track deaths per room until interrupted (default)
    Track {
        /// Write the final statistics table to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Locate the game object and print what discovery finds
    Scan {
        /// Process ID (skip automatic detection)
        #[arg(long)]
        pid: Option<u32>,
    },
    /// Read and print one snapshot of the game state
    Status {
        /// Process ID (skip automatic detection)
        #[arg(long)]
        pid: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
