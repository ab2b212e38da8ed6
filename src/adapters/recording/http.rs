//! Recording adapter for the `Downloader` port.

use std::path::Path;

use serde::Serialize;

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::ports::Downloader;

/// Records downloads, including the body, while delegating to an inner downloader.
pub struct RecordingDownloader {
    inner: Box<dyn Downloader>,
    recorder: SharedRecorder,
}

impl RecordingDownloader {
    /// Creates a recording downloader wrapping `inner`.
    pub fn new(inner: Box<dyn Downloader>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct DownloadInput<'a> {
    url: &'a str,
    dest: &'a Path,
}

/// Recorded outcome; `body` lets a replay recreate the file.
#[derive(Serialize)]
struct DownloadOutput {
    bytes: u64,
    body: String,
}

impl Downloader for RecordingDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.inner.download(url, dest);
        let recorded = result.as_ref().map(|&bytes| DownloadOutput {
            bytes,
            body: std::fs::read(dest)
                .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                .unwrap_or_default(),
        });
        record_result(
            &self.recorder,
            "http",
            "download",
            &DownloadInput { url, dest },
            &recorded,
        );
        result
    }
}
