//! Command dispatch and handlers.

pub mod elan;
pub mod install;
pub mod repo;
pub mod status;
pub mod version;

use std::env;
use std::path::Path;
use std::process::ExitCode;

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::context::ServiceContext;

/// Environment variable that switches on cassette recording.
pub const RECORD_ENV: &str = "LEANUP_RECORD";

/// Dispatch a parsed command to its handler.
///
/// When `LEANUP_RECORD` is set to a directory path, all port interactions are
/// recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<ExitCode, String> {
    let (ctx, session) = match env::var_os(RECORD_ENV) {
        Some(path) if !path.is_empty() => {
            let (ctx, session) = ServiceContext::recording_at(Path::new(&path))?;
            (ctx, Some(session))
        }
        _ => (ServiceContext::live(), None),
    };

    let result = dispatch_with_context(command, &ctx);

    if let Some(session) = session {
        // The recording adapters hold the recorders until the context is dropped.
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<ExitCode, String> {
    match command {
        Command::Install { version, force } => install::run(ctx, version.as_deref(), *force),
        Command::Elan { args } => elan::run(ctx, args),
        Command::Status { json } => status::run(ctx, *json),
        Command::Version => version::run(),
        Command::Repo { dir, action } => repo::run(ctx, dir, action),
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}

/// Renders an optional value, or `unknown`.
pub(crate) fn or_unknown<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}
