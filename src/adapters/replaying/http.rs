//! Replaying adapter for the `Downloader` port.

use std::path::Path;
use std::sync::Mutex;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::Downloader;

/// Replays recorded downloads, writing the recorded body to the destination.
pub struct ReplayingDownloader {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingDownloader {
    /// Creates a replaying downloader from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Mutex::new(replayer),
        }
    }
}

impl Downloader for ReplayingDownloader {
    fn download(
        &self,
        _url: &str,
        dest: &Path,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let output = {
            let mut replayer = self.replayer.lock().expect("replayer lock poisoned");
            replayer.next_interaction("http", "download").output
        };
        if let Some(err) = output.get("err") {
            return Err(err.as_str().unwrap_or("unknown error").to_string().into());
        }

        let body = output
            .get("ok")
            .and_then(|ok| ok.get("body"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, body)?;
        Ok(body.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use serde_json::json;

    fn downloader(output: serde_json::Value) -> ReplayingDownloader {
        let cassette = Cassette::from_interactions(
            "t",
            vec![Interaction::new("http", "download", json!({}), output)],
        );
        ReplayingDownloader::new(CassetteReplayer::new(&cassette))
    }

    #[test]
    fn writes_recorded_body() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("scratch").join("elan-init.sh");

        let bytes = downloader(json!({"ok": {"bytes": 8, "body": "echo hi\n"}}))
            .download("https://elan.lean-lang.org/elan-init.sh", &dest)
            .unwrap();

        assert_eq!(bytes, 8);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "echo hi\n");
    }

    #[test]
    fn replays_recorded_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("elan-init.sh");

        let err = downloader(json!({"err": "HTTP 503 Service Unavailable"}))
            .download("https://elan.lean-lang.org/elan-init.sh", &dest)
            .unwrap_err();

        assert!(err.to_string().contains("503"));
        assert!(!dest.exists());
    }
}
