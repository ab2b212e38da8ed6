//! Replaying adapter for the `CommandExecutor` port.

use std::sync::Mutex;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CommandExecutor, CommandSpec, ExecutionResult};

/// Replays recorded command results from a cassette.
pub struct ReplayingExecutor {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingExecutor {
    /// Creates a replaying executor from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Mutex::new(replayer),
        }
    }

    /// Number of recorded invocations not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replayer.lock().map_or(0, |r| r.remaining("shell", "run"))
    }
}

impl CommandExecutor for ReplayingExecutor {
    fn run(&self, spec: &CommandSpec) -> ExecutionResult {
        let interaction = {
            let mut replayer = self.replayer.lock().expect("replayer lock poisoned");
            replayer.next_interaction("shell", "run")
        };
        serde_json::from_value(interaction.output).unwrap_or_else(|e| {
            ExecutionResult::failure(format!(
                "cassette entry {} for `{}` is not an execution result: {e}",
                interaction.seq, spec.program
            ))
        })
    }
}
