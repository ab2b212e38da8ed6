//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between `leanup` and the outside world
//! (child processes, the network). Implementations live in `src/adapters/`.

pub mod http;
pub mod shell;

pub use http::Downloader;
pub use shell::{CommandExecutor, CommandSpec, ExecutionResult, EXECUTION_FAILURE};
