//! Runtime settings resolved from the environment.
//!
//! Each component resolves its own [`Settings`] at construction; nothing is
//! cached process-wide. Resolution order:
//!
//! ```text
//! elan_home        ELAN_HOME            | <home>/.elan
//! cache_dir        LEANUP_CACHE_DIR     | <cache>/leanup | <temp>/leanup
//! search_path      PATH (snapshot)
//! mismatch_policy  LEANUP_VERSION_MISMATCH = keep | reinstall   (default keep)
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::platform::OsType;

/// Environment variable overriding the elan installation directory.
pub const ELAN_HOME_ENV: &str = "ELAN_HOME";
/// Environment variable overriding the scratch/cache root.
pub const CACHE_DIR_ENV: &str = "LEANUP_CACHE_DIR";
/// Environment variable selecting the [`MismatchPolicy`].
pub const MISMATCH_POLICY_ENV: &str = "LEANUP_VERSION_MISMATCH";

/// What `install` does when elan is present but a different version was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Keep the installed elan, log a warning and report the unmet request.
    #[default]
    Keep,
    /// Run the installer again.
    Reinstall,
}

impl MismatchPolicy {
    /// Parses a policy name; unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "keep" => Some(Self::Keep),
            "reinstall" => Some(Self::Reinstall),
            _ => None,
        }
    }
}

/// Resolved paths and policies for one component instance.
#[derive(Debug, Clone)]
pub struct Settings {
    /// elan installation root.
    pub elan_home: PathBuf,
    /// Root under which transient installer artifacts are placed.
    pub cache_dir: PathBuf,
    /// Search path used to find elan outside `elan_home`. `None` disables the lookup.
    pub search_path: Option<OsString>,
    /// Version mismatch behaviour of `install`.
    pub mismatch_policy: MismatchPolicy,
    /// Operating system the installer targets.
    pub os: OsType,
}

impl Settings {
    /// Resolves settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if neither `ELAN_HOME` nor a home directory is
    /// available, or if `LEANUP_VERSION_MISMATCH` holds an unknown value.
    pub fn from_env() -> Result<Self> {
        let elan_home = match std::env::var_os(ELAN_HOME_ENV) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => dirs::home_dir()
                .map(|home| home.join(".elan"))
                .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))?,
        };

        let cache_dir = match std::env::var_os(CACHE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join("leanup"),
        };

        let mismatch_policy = match std::env::var(MISMATCH_POLICY_ENV) {
            Ok(value) => MismatchPolicy::parse(&value).ok_or_else(|| {
                Error::Config(format!(
                    "{MISMATCH_POLICY_ENV} must be `keep` or `reinstall`, got `{value}`"
                ))
            })?,
            Err(_) => MismatchPolicy::default(),
        };

        Ok(Self {
            elan_home,
            cache_dir,
            search_path: std::env::var_os("PATH"),
            mismatch_policy,
            os: OsType::detect(),
        })
    }

    /// Settings rooted at an explicit elan home, with an empty search path.
    ///
    /// The cache lives next to the home so that nothing leaks outside it.
    #[must_use]
    pub fn isolated(elan_home: &Path) -> Self {
        Self {
            elan_home: elan_home.to_path_buf(),
            cache_dir: elan_home.join(".leanup-cache"),
            search_path: None,
            mismatch_policy: MismatchPolicy::default(),
            os: OsType::detect(),
        }
    }

    /// Directory that holds the elan binaries.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.elan_home.join("bin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_policy_parses_known_names() {
        assert_eq!(MismatchPolicy::parse("keep"), Some(MismatchPolicy::Keep));
        assert_eq!(MismatchPolicy::parse(" Reinstall "), Some(MismatchPolicy::Reinstall));
        assert_eq!(MismatchPolicy::parse("sometimes"), None);
    }

    #[test]
    fn isolated_settings_derive_bin_dir() {
        let settings = Settings::isolated(Path::new("/opt/elan"));
        assert_eq!(settings.bin_dir(), PathBuf::from("/opt/elan/bin"));
        assert!(settings.search_path.is_none());
        assert_eq!(settings.mismatch_policy, MismatchPolicy::Keep);
    }
}
