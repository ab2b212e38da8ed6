//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--verbose` (debug)
//! 2. `LEANUP_LOG` environment variable (e.g. "warn", "debug")
//! 3. default to `info`
//!
//! Output goes to stderr so that stdout stays clean for command output.

use tracing::Level;
use tracing_subscriber::fmt;

/// Environment variable selecting the log level.
pub const LOG_ENV: &str = "LEANUP_LOG";

/// Installs the global subscriber.
///
/// A second call leaves the first subscriber in place.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        std::env::var(LOG_ENV).ok().and_then(|s| parse_level(&s)).unwrap_or(Level::INFO)
    };

    let _ = fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
