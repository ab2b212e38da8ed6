//! Cassette configuration for composable per-port replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Per-port cassette file paths. Ports without a cassette panic if called
/// during replay, which is how tests assert that a port was never touched.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Path to the command executor cassette.
    pub shell: Option<PathBuf>,
    /// Path to the downloader cassette.
    pub http: Option<PathBuf>,
}

/// Loaded per-port replayers.
pub struct PortReplayers {
    /// Replayer for the command executor.
    pub shell: Option<CassetteReplayer>,
    /// Replayer for the downloader.
    pub http: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// A config with no cassettes: every port panics when used.
    #[must_use]
    pub fn panic_on_unspecified() -> Self {
        Self::default()
    }

    /// Reads and parses one cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Cassette, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }

    /// Loads every configured cassette into its own replayer.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let replayer = |path: &Path| Self::load(path).map(|c| CassetteReplayer::new(&c));
        Ok(PortReplayers {
            shell: self.shell.as_deref().map(replayer).transpose()?,
            http: self.http.as_deref().map(replayer).transpose()?,
        })
    }
}
