//! Command executor port for running external programs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exit code reserved for failures inside the executor itself
/// (spawn errors, timeouts).
pub const EXECUTION_FAILURE: i32 = -1;

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
    /// Working directory; inherits the caller's when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables layered over the inherited environment.
    pub env: Vec<(String, String)>,
    /// Text written to the child's standard input.
    pub input: Option<String>,
    /// Buffer stdout/stderr when `true`; inherit the caller's streams otherwise.
    pub capture_output: bool,
    /// Upper bound on the total wait.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Starts a captured invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            input: None,
            capture_output: true,
            timeout: None,
        }
    }

    /// Builds a spec from an argv vector; an empty vector yields an empty program name.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Self {
        let mut parts = argv.iter();
        let program = parts.next().cloned().unwrap_or_default();
        Self::new(program).args(parts)
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Feeds `input` to the child's standard input.
    #[must_use]
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Attaches the child to the caller's standard streams instead of capturing.
    #[must_use]
    pub fn inherit_output(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Bounds the total wait.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Human-readable `program arg ...` rendering for logs.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Normalized outcome of one invocation.
///
/// `exit_code` is 0 on success. [`EXECUTION_FAILURE`] marks failures of the
/// executor itself; any other value comes from the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The captured standard output (empty when not captured).
    pub stdout: String,
    /// The captured standard error, or the executor's error text.
    pub stderr: String,
    /// The exit code of the process.
    pub exit_code: i32,
}

impl ExecutionResult {
    /// An executor-side failure carrying `message` as stderr.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: EXECUTION_FAILURE,
        }
    }

    /// Returns `true` when the program exited with code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<crate::error::Error> for ExecutionResult {
    fn from(err: crate::error::Error) -> Self {
        Self::failure(err.to_string())
    }
}

/// Runs external programs.
///
/// Implementations never fail: every problem is folded into the returned
/// [`ExecutionResult`]. Each call spawns at most one child process.
pub trait CommandExecutor: Send + Sync {
    /// Runs `spec` to completion (or timeout) and reports the outcome.
    fn run(&self, spec: &CommandSpec) -> ExecutionResult;
}
