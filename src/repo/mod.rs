//! Working-directory wrapper with file and git helpers.
//!
//! A [`RepoManager`] is bound to one absolute directory. Whether that
//! directory is a git checkout is decided by probing for `.git` at
//! construction and again after a clone; git operations on an unbound
//! directory fail before any process is spawned.

mod files;
mod git;

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

pub use files::Replace;
pub use git::{parse_porcelain, GitStatus};

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::platform::OsType;
use crate::ports::{CommandSpec, ExecutionResult};

/// Handle on a detected git checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitBinding {
    marker: PathBuf,
}

impl GitBinding {
    /// Looks for `<dir>/.git`, which may be a directory or a gitfile.
    fn probe(dir: &Path) -> Option<Self> {
        let marker = dir.join(".git");
        marker.exists().then_some(Self { marker })
    }

    /// Path of the `.git` marker.
    #[must_use]
    pub fn marker(&self) -> &Path {
        &self.marker
    }
}

/// A command given either as one string or as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// Split with shell rules on Unix, handed to `cmd /C` on Windows.
    Line(String),
    /// Program followed by its arguments.
    Argv(Vec<String>),
}

impl From<&str> for CommandLine {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(argv: Vec<String>) -> Self {
        Self::Argv(argv)
    }
}

/// File and git operations scoped to one working directory.
pub struct RepoManager<'a> {
    ctx: &'a ServiceContext,
    cwd: PathBuf,
    git: Option<GitBinding>,
    os: OsType,
}

impl<'a> RepoManager<'a> {
    /// Binds to `dir`, made absolute against the process working directory.
    ///
    /// The directory does not have to exist yet; [`RepoManager::clone_from`]
    /// creates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new(ctx: &'a ServiceContext, dir: impl AsRef<Path>) -> Result<Self> {
        let cwd = std::path::absolute(dir.as_ref())?;
        let git = GitBinding::probe(&cwd);
        debug!(cwd = %cwd.display(), git = git.is_some(), "repository probed");
        Ok(Self {
            ctx,
            cwd,
            git,
            os: OsType::detect(),
        })
    }

    /// Absolute working directory.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Whether `.git` was found at the last probe.
    #[must_use]
    pub fn is_gitrepo(&self) -> bool {
        self.git.is_some()
    }

    /// Git binding from the last probe.
    #[must_use]
    pub fn git_binding(&self) -> Option<&GitBinding> {
        self.git.as_ref()
    }

    /// Clones `url` into the working directory, then re-probes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `git clone` fails.
    pub fn clone_from(
        &mut self,
        url: &str,
        branch: Option<&str>,
        depth: Option<u32>,
    ) -> Result<()> {
        std::fs::create_dir_all(&self.cwd)?;
        let mut args = vec!["clone".to_string(), url.to_string(), ".".to_string()];
        if let Some(branch) = branch {
            args.extend(["--branch".to_string(), branch.to_string()]);
        }
        if let Some(depth) = depth {
            args.extend(["--depth".to_string(), depth.to_string()]);
        }

        let spec = CommandSpec::new("git")
            .args(args.iter().cloned())
            .cwd(&self.cwd);
        let result = self.ctx.shell.run(&spec);
        if !result.success() {
            let err = Error::Git {
                command: args.join(" "),
                code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            };
            error!(error = %err, "failed to clone repository");
            return Err(err);
        }

        self.git = GitBinding::probe(&self.cwd);
        info!(url, cwd = %self.cwd.display(), "repository cloned");
        Ok(())
    }

    /// Runs `command` in the working directory and returns its captured output.
    ///
    /// Commands that cannot be parsed come back as an execution failure.
    #[must_use]
    pub fn execute_command(&self, command: impl Into<CommandLine>) -> ExecutionResult {
        match self.command_spec(command.into()) {
            Ok(spec) => self.ctx.shell.run(&spec.cwd(&self.cwd)),
            Err(err) => {
                error!(error = %err, "invalid command");
                err.into()
            }
        }
    }

    fn command_spec(&self, command: CommandLine) -> Result<CommandSpec> {
        let argv = match command {
            CommandLine::Line(line) if self.os.is_windows() => {
                return Ok(CommandSpec::new("cmd").arg("/C").arg(line));
            }
            CommandLine::Line(line) => shell_words::split(&line)
                .map_err(|e| Error::CommandLine(format!("{e}: {line}")))?,
            CommandLine::Argv(argv) => argv,
        };
        if argv.is_empty() {
            return Err(Error::CommandLine("empty command".to_string()));
        }
        Ok(CommandSpec::from_argv(&argv))
    }

    /// Resolves `path` against the working directory.
    fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.cwd.join(path)
    }
}
