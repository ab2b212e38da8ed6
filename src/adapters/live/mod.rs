//! Live adapters for real external interactions.

pub mod http;
pub mod shell;

pub use http::HttpDownloader;
pub use shell::SystemExecutor;
