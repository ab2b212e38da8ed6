//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Shared handle to a recorder, cloned into each recording adapter.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// One recorder per port, all writing into a timestamped directory.
pub struct RecordingSession {
    /// Recorder for command executor interactions.
    pub shell: SharedRecorder,
    /// Recorder for downloader interactions.
    pub http: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a session writing to `<root>/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already exists or cannot be created.
    pub fn new(root: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let output_dir = root.join(&timestamp);

        if output_dir.exists() {
            return Err(format!(
                "Cassette directory already exists: {}",
                output_dir.display()
            ));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let recorder = |port: &str| -> SharedRecorder {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            Arc::new(Mutex::new(CassetteRecorder::new(
                path,
                format!("{timestamp}-{port}"),
            )))
        };

        Ok(Self {
            shell: recorder("shell"),
            http: recorder("http"),
            output_dir,
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every port's cassette and return the output directory.
    ///
    /// The recording adapters must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds a recorder or a file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(recorder: SharedRecorder, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(recorder)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder
                .finish()
                .map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.shell, "shell")?;
        finish_one(self.http, "http")?;
        Ok(self.output_dir)
    }
}
