//! Decycle CLI entry point.
//!
//! Parses arguments, wires up logging, and maps outcomes to exit codes:
//! 0 for a clean check, 1 when violations were found, 2 for usage or input
//! errors.

use clap::Parser;
use decycle::cli::{run, Cli};
use decycle::observability::init_tracing;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}
