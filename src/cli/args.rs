//! CLI argument definitions using clap
//!
//! Commands:
//! - tabrec inspect <location> [--config <path>] [--rows <n>]
//! - tabrec dataset <root> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabrec - inspect record bundles and datasets
#[derive(Parser, Debug)]
#[command(name = "tabrec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load one record and print its fields and leading rows
    Inspect {
        /// Record location (bundle path with or without extension)
        location: PathBuf,

        /// Path to a JSON store configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of rows to print
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },

    /// Load a dataset and print its records and metadata
    Dataset {
        /// Dataset root directory
        root: PathBuf,

        /// Path to a JSON store configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
