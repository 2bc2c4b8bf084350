//! tabrec CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. The error response
//! has already been printed by the time `run` returns an error; main only
//! sets the exit code.

use tabrec::cli;

fn main() {
    if cli::run().is_err() {
        std::process::exit(1);
    }
}
