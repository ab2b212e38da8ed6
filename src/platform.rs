//! Operating-system detection.

use std::fmt;

/// Operating system family the binary runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Linux distributions.
    Linux,
    /// Any other Unix-like system.
    Other,
}

impl OsType {
    /// Detects the operating system of the running process.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value to an [`OsType`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }

    /// Returns `true` on Windows.
    #[must_use]
    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }

    /// Appends the platform executable suffix to `base`.
    #[must_use]
    pub fn executable_name(self, base: &str) -> String {
        if self.is_windows() {
            format!("{base}.exe")
        } else {
            base.to_string()
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Other => "Unix",
        };
        f.write_str(name)
    }
}
