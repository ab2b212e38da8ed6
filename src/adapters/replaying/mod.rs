//! Replaying adapters that serve recorded interactions.

pub mod http;
pub mod shell;

pub use http::ReplayingDownloader;
pub use shell::ReplayingExecutor;
