//! Core library entry for the `leanup` CLI.
//!
//! `leanup` installs elan, the Lean toolchain manager, forwards commands to it,
//! and wraps everyday git and file operations on a working directory.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod elan;
pub mod error;
pub mod logging;
pub mod platform;
pub mod ports;
pub mod repo;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<ExitCode, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().map_err(|e| e.to_string())?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init_logging(cli.verbose);
    commands::dispatch(&cli.command)
}
