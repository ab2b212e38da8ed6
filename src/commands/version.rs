//! `leanup version` command.

use std::process::ExitCode;

/// Execute the `version` command.
///
/// # Errors
///
/// Never fails; the signature matches the other handlers.
pub fn run() -> Result<ExitCode, String> {
    println!("LeanUp Version: {}", env!("CARGO_PKG_VERSION"));
    Ok(ExitCode::SUCCESS)
}
