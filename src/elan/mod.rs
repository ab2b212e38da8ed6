//! Locating, installing and proxying the elan toolchain manager.
//!
//! Every query re-probes the filesystem and re-runs elan; nothing is cached
//! between calls.

pub mod installer;
pub mod parse;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{MismatchPolicy, Settings, MISMATCH_POLICY_ENV};
use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::ports::CommandSpec;

/// Base name of the elan executable.
pub const ELAN: &str = "elan";

/// Result of a successful [`ElanManager::install`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// elan was present, so the installer did not run.
    AlreadyInstalled {
        /// Version reported by the existing installation.
        version: Option<String>,
        /// Requested version that differs from the installed one, if any.
        requested: Option<String>,
    },
    /// The installer ran and elan is now present.
    Installed {
        /// Version reported after installation.
        version: Option<String>,
    },
}

/// Snapshot of an elan installation for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElanStatus {
    /// Whether an executable was found.
    pub installed: bool,
    /// Parsed `elan --version` output.
    pub version: Option<String>,
    /// Resolved `ELAN_HOME`.
    pub elan_home: PathBuf,
    /// Path of the executable that would be run.
    pub executable: Option<PathBuf>,
    /// Installed toolchains in elan's order.
    pub toolchains: Vec<String>,
}

/// Installer and proxy for elan.
pub struct ElanManager<'a> {
    ctx: &'a ServiceContext,
    settings: Settings,
}

impl<'a> ElanManager<'a> {
    /// Creates a manager with explicit settings.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, settings: Settings) -> Self {
        Self { ctx, settings }
    }

    /// Creates a manager with settings resolved from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be resolved.
    pub fn from_env(ctx: &'a ServiceContext) -> Result<Self> {
        Ok(Self::new(ctx, Settings::from_env()?))
    }

    /// Settings this manager resolved at construction.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolved installation home.
    #[must_use]
    pub fn elan_home(&self) -> &Path {
        &self.settings.elan_home
    }

    /// `<home>/bin`.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.settings.bin_dir()
    }

    /// Platform file name of the executable.
    #[must_use]
    pub fn executable_name(&self) -> String {
        self.settings.os.executable_name(ELAN)
    }

    /// Finds the executable under the bin directory, then on the search path.
    #[must_use]
    pub fn locate_executable(&self) -> Option<PathBuf> {
        let candidate = self.bin_dir().join(self.executable_name());
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
        let search_path = self.settings.search_path.as_ref()?;
        let cwd = std::env::current_dir().unwrap_or_default();
        match which::which_in(ELAN, Some(search_path), cwd) {
            Ok(found) => Some(found),
            Err(err) => {
                debug!(error = %err, "elan not found on search path");
                None
            }
        }
    }

    /// Whether an elan executable can be located.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.locate_executable().is_some()
    }

    /// Installed elan version, or `None` if missing or unparseable.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        let exe = self.locate_executable()?;
        let spec = CommandSpec::new(exe.to_string_lossy()).arg("--version");
        let result = self.ctx.shell.run(&spec);
        if !result.success() {
            debug!(
                code = result.exit_code,
                stderr = %result.stderr.trim(),
                "elan --version failed"
            );
            return None;
        }
        parse::parse_version(&result.stdout, ELAN)
    }

    /// Installed toolchains, empty on any failure.
    #[must_use]
    pub fn toolchains(&self) -> Vec<String> {
        let Some(exe) = self.locate_executable() else {
            return Vec::new();
        };
        let spec = CommandSpec::new(exe.to_string_lossy()).args(["toolchain", "list"]);
        let result = self.ctx.shell.run(&spec);
        if !result.success() {
            debug!(
                code = result.exit_code,
                stderr = %result.stderr.trim(),
                "elan toolchain list failed"
            );
            return Vec::new();
        }
        parse::parse_toolchains(&result.stdout)
    }

    /// Installs elan unless it is already present.
    ///
    /// With `force` the installer always runs. A `version` that differs from
    /// an existing installation is handled according to the configured
    /// [`MismatchPolicy`]; the official installer always fetches its own
    /// default release.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or installer fails, or if no
    /// executable can be found once the installer has finished.
    pub fn install(&self, version: Option<&str>, force: bool) -> Result<InstallOutcome> {
        if !force && self.is_installed() {
            let current = self.version();
            let installed = current.as_deref().unwrap_or("unknown");
            let unmet = version.filter(|wanted| !versions_match(current.as_deref(), wanted));
            match (unmet, self.settings.mismatch_policy) {
                (None, _) => {
                    info!(version = installed, "elan is already installed");
                    return Ok(InstallOutcome::AlreadyInstalled {
                        version: current,
                        requested: None,
                    });
                }
                (Some(wanted), MismatchPolicy::Keep) => {
                    warn!(
                        requested = wanted,
                        installed,
                        "keeping installed elan; override with {MISMATCH_POLICY_ENV}=reinstall"
                    );
                    return Ok(InstallOutcome::AlreadyInstalled {
                        version: current,
                        requested: Some(wanted.to_string()),
                    });
                }
                (Some(wanted), MismatchPolicy::Reinstall) => {
                    info!(
                        requested = wanted,
                        installed, "installed elan differs from request; reinstalling"
                    );
                }
            }
        }

        info!(
            os = %self.settings.os,
            elan_home = %self.elan_home().display(),
            "installing elan"
        );
        installer::run_installer(self.ctx, &self.settings)
            .inspect_err(|err| error!(error = %err, "elan installation failed"))?;

        if !self.is_installed() {
            let err = Error::InstallVerification(self.bin_dir());
            error!(error = %err, "elan installation could not be verified");
            return Err(err);
        }
        let version = self.version();
        info!(version = version.as_deref().unwrap_or("unknown"), "elan installed");
        Ok(InstallOutcome::Installed { version })
    }

    /// Runs elan with `args` on the caller's terminal and returns its exit code.
    ///
    /// Returns 1 without spawning anything when elan is missing, and 1 when
    /// the process could not be run at all.
    #[must_use]
    pub fn proxy(&self, args: &[String]) -> i32 {
        let Some(exe) = self.locate_executable() else {
            error!("elan is not installed; run `leanup install` first");
            return 1;
        };
        let spec = CommandSpec::new(exe.to_string_lossy())
            .args(args.iter().cloned())
            .inherit_output();
        debug!(command = %spec.display(), "proxying to elan");
        let result = self.ctx.shell.run(&spec);
        if result.exit_code < 0 {
            error!(error = %result.stderr.trim(), "failed to run elan");
            return 1;
        }
        result.exit_code
    }

    /// Aggregates installation state into one snapshot.
    #[must_use]
    pub fn status(&self) -> ElanStatus {
        let executable = self.locate_executable();
        let installed = executable.is_some();
        ElanStatus {
            installed,
            version: if installed { self.version() } else { None },
            elan_home: self.settings.elan_home.clone(),
            executable,
            toolchains: if installed { self.toolchains() } else { Vec::new() },
        }
    }
}

/// Compares version strings, ignoring a leading `v`.
fn versions_match(installed: Option<&str>, wanted: &str) -> bool {
    let strip = |v: &str| v.trim().trim_start_matches('v').to_string();
    installed.is_some_and(|current| strip(current) == strip(wanted))
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
