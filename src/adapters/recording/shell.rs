//! Recording adapter for the `CommandExecutor` port.

use super::record_interaction;
use crate::cassette::session::SharedRecorder;
use crate::ports::{CommandExecutor, CommandSpec, ExecutionResult};

/// Records every invocation while delegating to an inner executor.
pub struct RecordingExecutor {
    inner: Box<dyn CommandExecutor>,
    recorder: SharedRecorder,
}

impl RecordingExecutor {
    /// Creates a recording executor wrapping `inner`.
    pub fn new(inner: Box<dyn CommandExecutor>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl CommandExecutor for RecordingExecutor {
    fn run(&self, spec: &CommandSpec) -> ExecutionResult {
        let result = self.inner.run(spec);
        record_interaction(&self.recorder, "shell", "run", spec, &result);
        result
    }
}
