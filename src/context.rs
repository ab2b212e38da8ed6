//! Service context bundling the port trait objects.

use std::path::Path;

use crate::adapters::live::{HttpDownloader, SystemExecutor};
use crate::adapters::recording::{RecordingDownloader, RecordingExecutor};
use crate::adapters::replaying::{ReplayingDownloader, ReplayingExecutor};
use crate::cassette::config::CassetteConfig;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::{CommandExecutor, CommandSpec, Downloader, ExecutionResult};

/// Bundles the external boundaries used by the managers.
///
/// Constructors wire up different adapter implementations (live, recording,
/// replaying). Managers borrow the context; nothing here is global.
pub struct ServiceContext {
    /// Executor for child processes.
    pub shell: Box<dyn CommandExecutor>,
    /// Downloader for installer artifacts.
    pub http: Box<dyn Downloader>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(shell: Box<dyn CommandExecutor>, http: Box<dyn Downloader>) -> Self {
        Self { shell, http }
    }

    /// Creates a live context with real adapters.
    #[must_use]
    pub fn live() -> Self {
        Self::new(Box::new(SystemExecutor), Box::new(HttpDownloader::new()))
    }

    /// Creates a live context whose interactions are recorded under `root`.
    ///
    /// Drop the context before calling [`RecordingSession::finish`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory cannot be created.
    pub fn recording_at(root: &Path) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(root)?;
        let ctx = Self::new(
            Box::new(RecordingExecutor::new(Box::new(SystemExecutor), session.shell.clone())),
            Box::new(RecordingDownloader::new(
                Box::new(HttpDownloader::new()),
                session.http.clone(),
            )),
        );
        Ok((ctx, session))
    }

    /// Creates a replaying context from a single cassette holding every port.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = CassetteConfig::load(path)?;
        // Separate replayers keep the per-port cursors independent.
        Ok(Self::new(
            Box::new(ReplayingExecutor::new(CassetteReplayer::new(&cassette))),
            Box::new(ReplayingDownloader::new(CassetteReplayer::new(&cassette))),
        ))
    }

    /// Creates a replaying context from per-port cassettes.
    ///
    /// Ports without a cassette panic when called, so a test can prove that
    /// an operation never reached them.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;
        Ok(Self::new(
            match replayers.shell {
                Some(r) => Box::new(ReplayingExecutor::new(r)),
                None => Box::new(PanickingExecutor),
            },
            match replayers.http {
                Some(r) => Box::new(ReplayingDownloader::new(r)),
                None => Box::new(PanickingDownloader),
            },
        ))
    }
}

// --- Panicking adapters for unspecified ports ---

struct PanickingExecutor;
impl CommandExecutor for PanickingExecutor {
    fn run(&self, spec: &CommandSpec) -> ExecutionResult {
        panic!(
            "CommandExecutor port not configured in CassetteConfig; refused to run `{}`",
            spec.display()
        );
    }
}

struct PanickingDownloader;
impl Downloader for PanickingDownloader {
    fn download(
        &self,
        url: &str,
        _dest: &Path,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        panic!("Downloader port not configured in CassetteConfig; refused to fetch {url}");
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use serde_json::json;

    #[test]
    fn replaying_context_from_monolithic_cassette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.cassette.yaml");
        let cassette = Cassette::from_interactions(
            "full",
            vec![
                Interaction::new(
                    "shell",
                    "run",
                    json!({}),
                    json!({"stdout": "stable\n", "stderr": "", "exit_code": 0}),
                ),
                Interaction::new("http", "download", json!({}), json!({"ok": {"body": "x"}})),
            ],
        );
        std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

        let ctx = ServiceContext::replaying(&path).unwrap();
        assert_eq!(ctx.shell.run(&CommandSpec::new("elan")).stdout, "stable\n");
        let dest = dir.path().join("artifact");
        assert_eq!(ctx.http.download("https://example.com/a", &dest).unwrap(), 1);
    }

    #[test]
    #[should_panic(expected = "not configured in CassetteConfig")]
    fn unspecified_executor_panics_with_clear_message() {
        let ctx = ServiceContext::replaying_from(&CassetteConfig::panic_on_unspecified()).unwrap();
        let _ = ctx.shell.run(&CommandSpec::new("git").arg("status"));
    }

    #[test]
    fn recording_context_writes_session_on_finish() {
        let root = tempfile::tempdir().unwrap();
        let (ctx, session) = ServiceContext::recording_at(root.path()).unwrap();
        drop(ctx);
        let dir = session.finish().unwrap();
        assert!(dir.join("shell.cassette.yaml").exists());
    }
}
