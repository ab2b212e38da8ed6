//! Platform-specific elan installer invocation.
//!
//! ```text
//! Windows  powershell -Command <inline script>   (script downloads elan-init.ps1 itself)
//! others   Downloader -> <scratch>/elan-init.sh -> sh elan-init.sh -y
//! ```
//!
//! Both run with `ELAN_HOME` exported so the installer targets the resolved home.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{Settings, ELAN_HOME_ENV};
use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::platform::OsType;
use crate::ports::CommandSpec;

/// Official installer script for Unix-like systems.
pub const UNIX_INSTALLER_URL: &str = "https://elan.lean-lang.org/elan-init.sh";
/// Official installer script for Windows.
pub const WINDOWS_INSTALLER_URL: &str = "https://elan.lean-lang.org/elan-init.ps1";

/// Flavour of installer script used on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    /// `elan-init.ps1`, driven through PowerShell.
    PowerShell,
    /// `elan-init.sh`, downloaded then run with `sh`.
    Shell,
}

impl InstallerKind {
    /// Picks the installer for `os`.
    #[must_use]
    pub fn for_os(os: OsType) -> Self {
        if os.is_windows() {
            Self::PowerShell
        } else {
            Self::Shell
        }
    }

    /// Download URL of the installer script.
    #[must_use]
    pub fn url(self) -> &'static str {
        match self {
            Self::PowerShell => WINDOWS_INSTALLER_URL,
            Self::Shell => UNIX_INSTALLER_URL,
        }
    }

    /// File name the script is saved under.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::PowerShell => "elan-init.ps1",
            Self::Shell => "elan-init.sh",
        }
    }
}

/// Uniquely named directory under `<cache>/temp`, removed on drop.
pub(crate) struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub(crate) fn create(cache_dir: &Path) -> Result<Self> {
        let path = cache_dir.join("temp").join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_dir_all(&self.path) {
            debug!(path = %self.path.display(), error = %err, "could not remove scratch directory");
        }
    }
}

/// Inline PowerShell that fetches and runs `elan-init.ps1` without prompting.
#[must_use]
pub fn powershell_script(elan_home: &Path, url: &str) -> String {
    // Single-quoted PowerShell strings only need '' escaping.
    let home = elan_home.display().to_string().replace('\'', "''");
    let url = url.replace('\'', "''");
    format!(
        "$ErrorActionPreference = 'Stop'\n\
         $env:ELAN_HOME = '{home}'\n\
         Invoke-WebRequest -Uri '{url}' -OutFile 'elan-init.ps1'\n\
         & .\\elan-init.ps1 -NoPrompt 1\n\
         $code = $LASTEXITCODE\n\
         Remove-Item 'elan-init.ps1' -ErrorAction SilentlyContinue\n\
         exit $code\n"
    )
}

/// Runs the platform installer once.
///
/// The scratch directory, and with it any downloaded artifact, is removed on
/// every exit path.
pub(crate) fn run_installer(ctx: &ServiceContext, settings: &Settings) -> Result<()> {
    let kind = InstallerKind::for_os(settings.os);
    let scratch = ScratchDir::create(&settings.cache_dir)?;

    let spec = match kind {
        InstallerKind::PowerShell => {
            info!("installing elan via PowerShell");
            CommandSpec::new("powershell")
                .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"])
                .arg(powershell_script(&settings.elan_home, kind.url()))
        }
        InstallerKind::Shell => {
            let script = scratch.path().join(kind.file_name());
            info!(url = kind.url(), "downloading elan installer");
            ctx.http.download(kind.url(), &script).map_err(|e| Error::Download {
                url: kind.url().to_string(),
                message: e.to_string(),
            })?;
            make_executable(&script)?;
            info!("running elan installer script");
            CommandSpec::new("sh").arg(script.to_string_lossy()).arg("-y")
        }
    }
    .cwd(scratch.path())
    .env(ELAN_HOME_ENV, settings.elan_home.to_string_lossy());

    let result = ctx.shell.run(&spec);
    debug!(stdout = %result.stdout.trim_end(), "installer output");
    if !result.success() {
        return Err(Error::InstallerFailed {
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installer_kind_follows_os() {
        assert_eq!(InstallerKind::for_os(OsType::Windows), InstallerKind::PowerShell);
        assert_eq!(InstallerKind::for_os(OsType::Linux), InstallerKind::Shell);
        assert_eq!(InstallerKind::for_os(OsType::MacOs).url(), UNIX_INSTALLER_URL);
        assert_eq!(InstallerKind::PowerShell.url(), WINDOWS_INSTALLER_URL);
    }

    #[test]
    fn powershell_script_exports_home_and_runs_unattended() {
        let script = powershell_script(
            Path::new("C:\\Users\\o'neil\\.elan"),
            WINDOWS_INSTALLER_URL,
        );
        assert!(script.contains("$env:ELAN_HOME = 'C:\\Users\\o''neil\\.elan'"));
        assert!(script.contains("-Uri 'https://elan.lean-lang.org/elan-init.ps1'"));
        assert!(script.contains("-NoPrompt 1"));
        assert!(script.contains("exit $code"));
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let cache = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchDir::create(cache.path()).unwrap();
            std::fs::write(scratch.path().join("elan-init.sh"), "#!/bin/sh\n").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
        assert!(cache.path().join("temp").exists());
    }

    #[test]
    fn scratch_dirs_are_unique() {
        let cache = tempfile::tempdir().unwrap();
        let a = ScratchDir::create(cache.path()).unwrap();
        let b = ScratchDir::create(cache.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
