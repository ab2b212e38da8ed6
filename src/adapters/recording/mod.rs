//! Recording adapters that capture interactions to cassettes.
//!
//! Fallible methods are stored as `{"ok": value}` or `{"err": message}`,
//! which is the shape the replaying adapters read back.

pub mod http;
pub mod shell;

pub use http::RecordingDownloader;
pub use shell::RecordingExecutor;

use serde::Serialize;
use tracing::warn;

use crate::cassette::session::SharedRecorder;

/// Appends one interaction, logging instead of failing if it cannot be stored.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let (input, output) = match (
        serde_json::to_value(input),
        serde_json::to_value(output),
    ) {
        (Ok(input), Ok(output)) => (input, output),
        (Err(e), _) | (_, Err(e)) => {
            warn!(port, method, error = %e, "interaction not recorded: serialization failed");
            return;
        }
    };
    match recorder.lock() {
        Ok(mut guard) => guard.record(port, method, input, output),
        Err(e) => warn!(port, method, error = %e, "interaction not recorded: lock poisoned"),
    }
}

/// Records a `Result` using the `ok`/`err` convention.
pub(crate) fn record_result<T, E, I>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let output = match result {
        Ok(value) => serde_json::json!({ "ok": value }),
        Err(e) => serde_json::json!({ "err": e.to_string() }),
    };
    record_interaction(recorder, port, method, input, &output);
}
