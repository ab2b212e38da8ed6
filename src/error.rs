//! Crate-wide error type and result alias.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures that can cross an operation boundary in `leanup`.
///
/// Every public operation that can fail returns this type instead of
/// panicking; the CLI layer decides how to report it.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem or other I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A child process could not be started.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A child process outlived its timeout and was killed.
    #[error("`{program}` timed out after {timeout:?}")]
    Timeout {
        /// Program that was killed.
        program: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Downloading the installer artifact failed.
    #[error("download of {url} failed: {message}")]
    Download {
        /// Requested URL.
        url: String,
        /// Transport or HTTP error text.
        message: String,
    },

    /// The installer ran but reported failure.
    #[error("installer exited with code {code}: {stderr}")]
    InstallerFailed {
        /// Exit code reported by the installer.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// The installer finished but no executable can be found afterwards.
    #[error("installation completed, but no elan executable was found under {0}")]
    InstallVerification(PathBuf),

    /// A git operation was requested outside a checkout.
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    /// The target file of an edit does not exist.
    #[error("file does not exist: {0}")]
    FileNotFound(PathBuf),

    /// A git invocation exited non-zero.
    #[error("`git {command}` exited with code {code}: {stderr}")]
    Git {
        /// Git subcommand and arguments.
        command: String,
        /// Exit code.
        code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// A command line string could not be split into arguments.
    #[error("invalid command line: {0}")]
    CommandLine(String),

    /// A find/replace pattern was not a valid regular expression.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A listing filter was not a valid glob.
    #[error("invalid glob: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
