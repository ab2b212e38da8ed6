//! `leanup install` command.

use std::fmt::Write as _;
use std::process::ExitCode;

use super::or_unknown;
use crate::config::MISMATCH_POLICY_ENV;
use crate::context::ServiceContext;
use crate::elan::{ElanManager, ElanStatus, InstallOutcome};
use crate::platform::OsType;

/// Execute the `install` command.
///
/// # Errors
///
/// Returns an error string if settings cannot be resolved or installation fails.
pub fn run(ctx: &ServiceContext, version: Option<&str>, force: bool) -> Result<ExitCode, String> {
    let manager = ElanManager::from_env(ctx).map_err(|e| e.to_string())?;
    let os = manager.settings().os;

    println!("Installing elan for {os}...");
    if let Some(version) = version {
        println!("Requested version: {version}");
    }

    let outcome = manager
        .install(version, force)
        .map_err(|e| format!("elan installation failed: {e}"))?;
    println!("{}", headline(&outcome));
    print!("{}", summary(&manager.status(), os));
    Ok(ExitCode::SUCCESS)
}

fn headline(outcome: &InstallOutcome) -> String {
    match outcome {
        InstallOutcome::Installed { .. } => "elan installation successful!".to_string(),
        InstallOutcome::AlreadyInstalled { requested: None, .. } => {
            "elan is already installed.".to_string()
        }
        InstallOutcome::AlreadyInstalled { version, requested: Some(requested) } => format!(
            "elan {} is already installed; requested version {requested} was not installed.\n\
             Run with --force or set {MISMATCH_POLICY_ENV}=reinstall to run the installer.",
            or_unknown(version.as_deref()),
        ),
    }
}

fn summary(status: &ElanStatus, os: OsType) -> String {
    let mut out = String::new();
    let executable = status.executable.as_ref().map(|p| p.display());
    let _ = writeln!(out, "Installation location: {}", or_unknown(executable));
    let _ = writeln!(out, "ELAN_HOME: {}", status.elan_home.display());
    let _ = writeln!(out, "Version: {}", or_unknown(status.version.as_deref()));

    if !os.is_windows() {
        out.push_str(
            "\nNote: You may need to restart your terminal or run one of \
             the following to update PATH:\n\
             \x20  source ~/.bashrc\n\
             \x20  source ~/.zshrc\n",
        );
    }
    out.push_str(
        "\nYou can now use the following commands:\n\
         \x20  leanup elan --help      # Show elan help\n\
         \x20  leanup status           # Check status\n",
    );
    out
}
