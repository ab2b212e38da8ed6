//! Live downloader using the blocking `reqwest` client.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use reqwest::Url;
use tracing::{debug, info};

use crate::ports::http::Downloader;

/// Size of each read from the response body.
pub const CHUNK_SIZE: usize = 8192;

const AGENT: &str = concat!("leanup/", env!("CARGO_PKG_VERSION"));

/// Live downloader that streams HTTPS responses to disk.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Creates a new downloader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `url` and rejects anything that is not HTTPS.
fn validate_url(url: &str) -> Result<Url, Box<dyn std::error::Error + Send + Sync>> {
    let parsed = Url::parse(url).map_err(|e| format!("invalid URL {url}: {e}"))?;
    if parsed.scheme() != "https" {
        return Err(format!("refusing to download over {}: {url}", parsed.scheme()).into());
    }
    Ok(parsed)
}

impl Downloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let parsed = validate_url(url)?;
        info!(url, dest = %dest.display(), "downloading");

        let mut response = self.client.get(parsed).header(USER_AGENT, AGENT).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "HTTP {} {} from {url}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error")
            )
            .into());
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(dest)?;
        let mut buf = [0u8; CHUNK_SIZE];
        let mut total: u64 = 0;
        loop {
            let n = response.read(&mut buf)?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
            total += n as u64;
        }
        file.flush()?;

        debug!(bytes = total, dest = %dest.display(), "download complete");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_urls() {
        let url = validate_url("https://elan.lean-lang.org/elan-init.sh").unwrap();
        assert_eq!(url.host_str(), Some("elan.lean-lang.org"));
    }

    #[test]
    fn rejects_plain_http_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("elan-init.sh");

        let err = HttpDownloader::new().download("http://example.com/elan-init.sh", &dest);

        assert!(err.unwrap_err().to_string().contains("refusing"));
        assert!(!dest.exists());
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(validate_url("not a url").is_err());
    }
}
