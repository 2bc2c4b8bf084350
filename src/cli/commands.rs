//! CLI command implementations
//!
//! Every command ends with one JSON response line on stdout:
//! `{"status": "ok", "data": ...}` or `{"status": "error", "code": ..., "message": ...}`.
//! INFO and WARN log lines from loading come before it on stdout; ERROR log
//! lines go to stderr.

use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value as JsonValue};

use super::args::Command;
use super::errors::{CliError, CliResult};
use crate::config::StoreConfig;
use crate::dataset::Dataset;
use crate::record::Record;

/// Main CLI entry point. This is the only function main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(&e)?;
            Err(e)
        }
    }
}

/// Run a command and return its response payload
pub fn run_command(cmd: Command) -> CliResult<JsonValue> {
    match cmd {
        Command::Inspect {
            location,
            config,
            rows,
        } => inspect(&location, &load_config(config.as_deref())?, rows),
        Command::Dataset { root, config } => dataset(&root, load_config(config.as_deref())?),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<StoreConfig> {
    match path {
        Some(path) => Ok(StoreConfig::load(path)?),
        None => Ok(StoreConfig::default()),
    }
}

/// Loads one record and summarizes it with its first `rows` rows.
pub fn inspect(location: &Path, config: &StoreConfig, rows: usize) -> CliResult<JsonValue> {
    let mut record = Record::builder(location).config(config.clone()).build()?;
    record.load()?;

    let fields: Vec<JsonValue> = record
        .columns()
        .map(|(name, values)| json!({"name": name, "len": values.len()}))
        .collect();
    let preview: Vec<JsonValue> = record
        .iter()
        .take(rows)
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;

    Ok(json!({
        "bundle": record.bundle_path().display().to_string(),
        "rows": record.len(),
        "fields": fields,
        "preview": preview,
    }))
}

/// Opens and loads a dataset and summarizes it.
pub fn dataset(root: &Path, config: StoreConfig) -> CliResult<JsonValue> {
    let mut dataset = Dataset::open_with_config(root, config)?;
    dataset.load()?;

    let records: Vec<JsonValue> = dataset
        .records()
        .iter()
        .map(|r| {
            json!({
                "location": r.location().display().to_string(),
                "rows": r.len(),
                "fields": r.field_names().collect::<Vec<_>>(),
            })
        })
        .collect();

    Ok(json!({
        "root": dataset.root().display().to_string(),
        "rows": dataset.len(),
        "records": records,
        "metadata": dataset.metadata(),
    }))
}

fn write_response(data: JsonValue) -> CliResult<()> {
    write_json(&json!({"status": "ok", "data": data}))
}

fn write_error(err: &CliError) -> CliResult<()> {
    write_json(&json!({
        "status": "error",
        "code": err.code().code(),
        "message": err.message(),
    }))
}

fn write_json(value: &JsonValue) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
