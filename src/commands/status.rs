//! `leanup status` command.

use std::fmt::Write as _;
use std::process::ExitCode;

use super::or_unknown;
use crate::context::ServiceContext;
use crate::elan::{ElanManager, ElanStatus};
use crate::platform::OsType;

/// Execute the `status` command.
///
/// Prints the elan installation snapshot, as text or as JSON.
///
/// # Errors
///
/// Returns an error string if settings cannot be resolved or JSON encoding fails.
pub fn run(ctx: &ServiceContext, json: bool) -> Result<ExitCode, String> {
    let manager = ElanManager::from_env(ctx).map_err(|e| e.to_string())?;
    let status = manager.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&status).map_err(|e| e.to_string())?);
    } else {
        print!("{}", render(&status, manager.settings().os));
    }
    Ok(ExitCode::SUCCESS)
}

fn render(status: &ElanStatus, os: OsType) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "LeanUp Status Information");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Operating System: {os}");

    if !status.installed {
        let _ = writeln!(out, "elan Status: Not Installed");
        let _ = writeln!(out, "ELAN_HOME: {}", status.elan_home.display());
        let _ = writeln!(out, "Tip: Run 'leanup install' to install elan");
        return out;
    }

    let executable = status.executable.as_ref().map(|p| p.display());
    let _ = writeln!(out, "elan Status: Installed");
    let _ = writeln!(out, "Version: {}", or_unknown(status.version.as_deref()));
    let _ = writeln!(out, "Executable: {}", or_unknown(executable));
    let _ = writeln!(out, "ELAN_HOME: {}", status.elan_home.display());

    if status.toolchains.is_empty() {
        let _ = writeln!(out, "Installed Toolchains: None");
        let _ = writeln!(
            out,
            "Tip: Run 'leanup elan toolchain install stable' to install stable toolchain"
        );
    } else {
        let _ = writeln!(out, "Installed Toolchains ({}):", status.toolchains.len());
        for toolchain in &status.toolchains {
            let _ = writeln!(out, "   • {toolchain}");
        }
    }
    out
}
