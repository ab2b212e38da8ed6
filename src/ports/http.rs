//! Download port for fetching installer artifacts.

use std::path::Path;

/// Fetches remote files to disk.
///
/// Abstracting the network allows the installer to be replayed from a
/// cassette without touching the internet.
pub trait Downloader: Send + Sync {
    /// Downloads `url` into `dest`, creating parent directories, and returns
    /// the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error for non-HTTPS URLs, transport failures, non-success
    /// HTTP statuses, or local write failures.
    fn download(
        &self,
        url: &str,
        dest: &Path,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}
