//! `leanup elan` command.

use std::process::ExitCode;

use crate::context::ServiceContext;
use crate::elan::ElanManager;

/// Execute the `elan` command, forwarding `args` to elan.
///
/// # Errors
///
/// Returns an error string if settings cannot be resolved.
pub fn run(ctx: &ServiceContext, args: &[String]) -> Result<ExitCode, String> {
    let manager = ElanManager::from_env(ctx).map_err(|e| e.to_string())?;
    Ok(exit_code(manager.proxy(args)))
}

/// Maps a child exit code onto the range a process can report.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_clamped() {
        assert_eq!(format!("{:?}", exit_code(0)), format!("{:?}", ExitCode::SUCCESS));
        assert_eq!(format!("{:?}", exit_code(300)), format!("{:?}", ExitCode::from(1)));
        assert_eq!(format!("{:?}", exit_code(42)), format!("{:?}", ExitCode::from(42)));
    }
}
