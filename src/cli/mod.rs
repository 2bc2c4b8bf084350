//! CLI module for tabrec
//!
//! Read-only inspection:
//! - inspect: load one record, print fields and leading rows
//! - dataset: load a dataset, print records and metadata

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{dataset, inspect, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
