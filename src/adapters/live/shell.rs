//! Live command executor using `std::process::Command`.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::{Error, Result};
use crate::ports::shell::{CommandExecutor, CommandSpec, ExecutionResult, EXECUTION_FAILURE};

/// How long a killed child's pipes get to close before their readers are abandoned.
const REAP_GRACE: Duration = Duration::from_millis(100);

/// Live executor that spawns real child processes.
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn run(&self, spec: &CommandSpec) -> ExecutionResult {
        debug!(command = %spec.display(), capture = spec.capture_output, "spawning process");
        match execute(spec) {
            Ok(result) => {
                debug!(command = %spec.program, exit_code = result.exit_code, "process exited");
                result
            }
            Err(err) => {
                debug!(command = %spec.program, error = %err, "process execution failed");
                ExecutionResult::from(err)
            }
        }
    }
}

fn execute(spec: &CommandSpec) -> Result<ExecutionResult> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(if spec.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }
    if spec.capture_output {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }

    let deadline = spec.timeout.map(|timeout| Instant::now() + timeout);
    let mut child = cmd.spawn().map_err(|source| Error::Spawn {
        program: spec.program.clone(),
        source,
    })?;

    // Pipes are serviced on their own threads so a chatty child cannot
    // deadlock against a full buffer while we wait on it.
    let writer = spawn_writer(child.stdin.take(), spec.input.clone());
    let (tx, rx) = mpsc::channel();
    let mut pending = 0;
    if let Some(stdout) = child.stdout.take() {
        spawn_reader(stdout, Stream::Stdout, tx.clone());
        pending += 1;
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(stderr, Stream::Stderr, tx.clone());
        pending += 1;
    }
    drop(tx);

    let status = match wait(&mut child, spec, deadline) {
        Ok(status) => status,
        Err(err) => {
            // Give the readers a moment to see EOF from the killed child.
            let _ = drain(&rx, pending, Some(Instant::now() + REAP_GRACE));
            reap_writer(writer);
            return Err(err);
        }
    };

    // A background grandchild can keep the pipes open after the child exits.
    let Some(output) = drain(&rx, pending, deadline) else {
        warn!(command = %spec.program, "output still open when the timeout elapsed");
        reap_writer(writer);
        return Err(timed_out(spec));
    };
    reap_writer(writer);
    Ok(ExecutionResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: exit_code(status),
    })
}

fn timed_out(spec: &CommandSpec) -> Error {
    Error::Timeout {
        program: spec.program.clone(),
        timeout: spec.timeout.unwrap_or_default(),
    }
}

/// Waits for `child`, killing and reaping it if the deadline passes.
fn wait(child: &mut Child, spec: &CommandSpec, deadline: Option<Instant>) -> Result<ExitStatus> {
    let Some(deadline) = deadline else {
        return Ok(child.wait()?);
    };

    match child.wait_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(Some(status)) => Ok(status),
        Ok(None) => {
            warn!(command = %spec.program, timeout = ?spec.timeout, "process timed out; killing");
            terminate(child);
            Err(timed_out(spec))
        }
        Err(err) => {
            terminate(child);
            Err(Error::Io(err))
        }
    }
}

fn terminate(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!(error = %err, "kill failed; process may have already exited");
    }
    // Reap so no zombie is left behind.
    let _ = child.wait();
}

fn spawn_writer<W>(stdin: Option<W>, input: Option<String>) -> Option<JoinHandle<()>>
where
    W: Write + Send + 'static,
{
    let (mut stdin, input) = (stdin?, input?);
    Some(thread::spawn(move || {
        // A child that exits without reading its input yields EPIPE; that is not our failure.
        let _ = stdin.write_all(input.as_bytes());
    }))
}

/// Joins the writer if it is done; a pipe held open elsewhere leaves it detached.
fn reap_writer(writer: Option<JoinHandle<()>>) {
    match writer {
        Some(handle) if handle.is_finished() => {
            let _ = handle.join();
        }
        Some(_) => debug!("stdin writer still blocked; detaching"),
        None => {}
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

#[derive(Default)]
struct Output {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

fn spawn_reader<R>(mut stream: R, which: Stream, tx: Sender<(Stream, Vec<u8>)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        // The receiver is gone once the call has given up on this stream.
        let _ = tx.send((which, buf));
    });
}

/// Collects `pending` reader buffers, or `None` if `deadline` passes first.
fn drain(
    rx: &Receiver<(Stream, Vec<u8>)>,
    mut pending: usize,
    deadline: Option<Instant>,
) -> Option<Output> {
    let mut output = Output::default();
    while pending > 0 {
        let received = match deadline {
            None => rx.recv().ok(),
            Some(deadline) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(message) => Some(message),
                    Err(RecvTimeoutError::Timeout) => return None,
                    Err(RecvTimeoutError::Disconnected) => None,
                }
            }
        };
        // Disconnected: a reader panicked, keep what arrived.
        let Some((which, bytes)) = received else {
            break;
        };
        match which {
            Stream::Stdout => output.stdout = bytes,
            Stream::Stderr => output.stderr = bytes,
        }
        pending -= 1;
    }
    Some(output)
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    EXECUTION_FAILURE
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let result = SystemExecutor.run(&CommandSpec::new("echo").arg("hello"));

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn captures_exit_code() {
        let result = SystemExecutor.run(&CommandSpec::new("sh").args(["-c", "exit 42"]));

        assert_eq!(result.exit_code, 42);
    }

    #[test]
    fn feeds_input_to_stdin() {
        let result = SystemExecutor.run(&CommandSpec::new("cat").input("piped text"));

        assert!(result.success());
        assert_eq!(result.stdout, "piped text");
    }

    #[test]
    fn passes_environment_and_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("sh")
            .args(["-c", "printf '%s|' \"$LEANUP_TEST_VAR\"; pwd"])
            .env("LEANUP_TEST_VAR", "set")
            .cwd(dir.path());

        let result = SystemExecutor.run(&spec);

        let (var, cwd) = result.stdout.trim().split_once('|').unwrap();
        assert_eq!(var, "set");
        assert_eq!(
            std::fs::canonicalize(cwd).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    fn missing_program_reports_execution_failure() {
        let result = SystemExecutor.run(&CommandSpec::new("leanup-no-such-program-4d1f"));

        assert_eq!(result.exit_code, EXECUTION_FAILURE);
        assert!(!result.stderr.is_empty());
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn timeout_kills_long_running_process() {
        let spec = CommandSpec::new("sleep").arg("5").timeout(Duration::from_millis(200));

        let started = Instant::now();
        let result = SystemExecutor.run(&spec);

        assert_eq!(result.exit_code, EXECUTION_FAILURE);
        assert!(result.stderr.contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn timeout_covers_output_held_open_by_background_process() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "sleep 4 & echo hi"])
            .timeout(Duration::from_millis(300));

        let started = Instant::now();
        let result = SystemExecutor.run(&spec);

        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
        assert_eq!(result.exit_code, EXECUTION_FAILURE);
        assert!(result.stderr.contains("timed out"));
    }

    #[test]
    fn fast_process_finishes_within_timeout() {
        let spec = CommandSpec::new("echo").arg("quick").timeout(Duration::from_secs(10));

        let result = SystemExecutor.run(&spec);

        assert!(result.success());
        assert_eq!(result.stdout.trim(), "quick");
    }

    #[test]
    fn signal_termination_maps_above_128() {
        let result = SystemExecutor.run(&CommandSpec::new("sh").args(["-c", "kill -TERM $$"]));

        assert_eq!(result.exit_code, 128 + 15);
    }
}
