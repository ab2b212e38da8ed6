//! Git operations through the `git` CLI.

use serde::Serialize;
use tracing::{debug, error};

use super::RepoManager;
use crate::error::{Error, Result};
use crate::ports::{CommandSpec, ExecutionResult};

/// Summary of `git status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitStatus {
    /// Checked-out branch; `None` on a detached HEAD.
    pub branch: Option<String>,
    /// Staged or unstaged changes to tracked files.
    pub is_dirty: bool,
    /// Paths git does not track.
    pub untracked_files: Vec<String>,
    /// Tracked paths with unstaged changes.
    pub modified_files: Vec<String>,
}

/// Parses `git status --porcelain=v1 -z --branch` output.
///
/// Records are NUL-terminated and paths are verbatim. A rename or copy is
/// followed by an extra record holding the source path.
#[must_use]
pub fn parse_porcelain(output: &str) -> GitStatus {
    let mut status = GitStatus::default();
    let mut records = output.split('\0');
    while let Some(record) = records.next() {
        if let Some(header) = record.strip_prefix("## ") {
            status.branch = parse_branch(header);
            continue;
        }
        let Some((xy, path)) = record.get(..2).zip(record.get(3..)) else {
            continue;
        };
        if xy.contains(['R', 'C']) {
            records.next();
        }
        if path.is_empty() {
            continue;
        }
        match xy {
            "??" => status.untracked_files.push(path.to_string()),
            "!!" => {}
            code => {
                status.is_dirty = true;
                // Second column is the worktree state.
                if !matches!(code.as_bytes().get(1), None | Some(b' ')) {
                    status.modified_files.push(path.to_string());
                }
            }
        }
    }
    status
}

fn parse_branch(header: &str) -> Option<String> {
    if header.starts_with("HEAD (no branch)") {
        return None;
    }
    let name = header
        .strip_prefix("No commits yet on ")
        .or_else(|| header.strip_prefix("Initial commit on "))
        .unwrap_or(header);
    let name = name.split("...").next().unwrap_or(name);
    name.split_whitespace().next().map(String::from)
}

impl RepoManager<'_> {
    /// Branch and change summary of the checkout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] for an unbound directory, or
    /// [`Error::Git`] if git fails.
    pub fn git_status(&self) -> Result<GitStatus> {
        let result = self.git(&[
            "status",
            "--porcelain=v1",
            "-z",
            "--branch",
            "--untracked-files=all",
        ])?;
        Ok(parse_porcelain(&result.stdout))
    }

    /// Stages `paths`, or everything when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] for an unbound directory, or
    /// [`Error::Git`] if git fails.
    pub fn git_add(&self, paths: Option<&[String]>) -> Result<()> {
        let mut args = vec!["add"];
        match paths {
            Some(paths) => {
                args.push("--");
                args.extend(paths.iter().map(String::as_str));
            }
            None => args.push("-A"),
        }
        self.git(&args).map(drop)
    }

    /// Commits the index with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] for an unbound directory, or
    /// [`Error::Git`] if git fails (including when there is nothing to commit).
    pub fn git_commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message]).map(drop)
    }

    /// Pulls from `remote`/`branch`, or the configured upstream when no branch is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] for an unbound directory, or
    /// [`Error::Git`] if git fails.
    pub fn git_pull(&self, remote: &str, branch: Option<&str>) -> Result<()> {
        self.sync("pull", remote, branch)
    }

    /// Pushes to `remote`/`branch`, or the configured upstream when no branch is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] for an unbound directory, or
    /// [`Error::Git`] if git fails.
    pub fn git_push(&self, remote: &str, branch: Option<&str>) -> Result<()> {
        self.sync("push", remote, branch)
    }

    fn sync(&self, verb: &str, remote: &str, branch: Option<&str>) -> Result<()> {
        match branch {
            Some(branch) => self.git(&[verb, remote, branch]),
            None => self.git(&[verb]),
        }
        .map(drop)
    }

    /// Runs `git <args>` in the checkout, failing fast when unbound.
    fn git(&self, args: &[&str]) -> Result<ExecutionResult> {
        if !self.is_gitrepo() {
            let err = Error::NotARepository(self.cwd.clone());
            error!(error = %err, "git operation refused");
            return Err(err);
        }
        let spec = CommandSpec::new("git").args(args.iter().copied()).cwd(&self.cwd);
        debug!(command = %spec.display(), "running git");
        let result = self.ctx.shell.run(&spec);
        if !result.success() {
            let err = Error::Git {
                command: args.join(" "),
                code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            };
            error!(error = %err, "git operation failed");
            return Err(err);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::{capturing, exec, scripted, sealed};
    use crate::context::ServiceContext;

    fn checkout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[test]
    fn unbound_directory_refuses_every_git_operation() {
        let dir = tempfile::tempdir().unwrap();
        // Sealed context: any spawn attempt would panic.
        let ctx = sealed();
        let repo = RepoManager::new(&ctx, dir.path()).unwrap();

        assert!(!repo.is_gitrepo());
        assert!(matches!(repo.git_status(), Err(Error::NotARepository(_))));
        assert!(matches!(repo.git_add(None), Err(Error::NotARepository(_))));
        assert!(matches!(repo.git_commit("msg"), Err(Error::NotARepository(_))));
        assert!(matches!(repo.git_pull("origin", None), Err(Error::NotARepository(_))));
        assert!(matches!(repo.git_push("origin", Some("main")), Err(Error::NotARepository(_))));
        assert!(!dir.path().join(".git").exists());
    }

    #[test]
    fn status_is_parsed_from_porcelain() {
        let dir = checkout();
        let (ctx, seen) = capturing(
            vec![exec(
                "## main...origin/main [ahead 1]\0 M src/lib.rs\0?? new.txt\0",
                "",
                0,
            )],
            vec![],
        );
        let repo = RepoManager::new(&ctx, dir.path()).unwrap();

        let status = repo.git_status().unwrap();
        assert_eq!(status.branch.as_deref(), Some("main"));
        assert!(status.is_dirty);
        assert_eq!(status.modified_files, vec!["src/lib.rs"]);
        assert_eq!(status.untracked_files, vec!["new.txt"]);

        let spec = seen.single();
        assert_eq!(spec.program, "git");
        assert_eq!(
            spec.args,
            vec!["status", "--porcelain=v1", "-z", "--branch", "--untracked-files=all"]
        );
        assert_eq!(spec.cwd.as_deref(), Some(repo.cwd()));
    }

    #[test]
    fn failing_git_becomes_error() {
        let dir = checkout();
        let ctx = scripted(
            vec![exec("", "nothing to commit, working tree clean\n", 1)],
            vec![],
        );
        let repo = RepoManager::new(&ctx, dir.path()).unwrap();

        let err = repo.git_commit("empty").unwrap_err();
        assert!(matches!(err, Error::Git { code: 1, ref command, ref stderr }
            if command == "commit -m empty" && stderr == "nothing to commit, working tree clean"));
    }

    #[test]
    fn operations_build_expected_git_arguments() {
        let dir = checkout();
        let ok = || exec("", "", 0);
        let (ctx, seen) = capturing(vec![ok(), ok(), ok(), ok(), ok(), ok()], vec![]);
        let repo = RepoManager::new(&ctx, dir.path()).unwrap();

        repo.git_add(None).unwrap();
        repo.git_add(Some(&["a.txt".to_string(), "-odd".to_string()]))
            .unwrap();
        repo.git_commit("fix: the thing").unwrap();
        repo.git_pull("upstream", Some("main")).unwrap();
        repo.git_push("origin", None).unwrap();
        repo.git_push("origin", Some("feature")).unwrap();

        let specs = seen.specs();
        let args: Vec<Vec<&str>> = specs
            .iter()
            .map(|s| s.args.iter().map(String::as_str).collect())
            .collect();
        assert_eq!(
            args,
            vec![
                vec!["add", "-A"],
                vec!["add", "--", "a.txt", "-odd"],
                vec!["commit", "-m", "fix: the thing"],
                vec!["pull", "upstream", "main"],
                vec!["push"],
                vec!["push", "origin", "feature"],
            ]
        );
        for spec in &specs {
            assert_eq!(spec.program, "git");
            assert_eq!(spec.cwd.as_deref(), Some(repo.cwd()));
        }
    }

    #[test]
    fn porcelain_clean_tree() {
        let status = parse_porcelain("## main\0");
        assert_eq!(
            status,
            GitStatus {
                branch: Some("main".into()),
                ..GitStatus::default()
            }
        );
    }

    #[test]
    fn porcelain_staged_only_is_dirty_but_not_modified() {
        let status = parse_porcelain("## dev\0A  added.rs\0M  staged.rs\0");
        assert!(status.is_dirty);
        assert!(status.modified_files.is_empty());
    }

    #[test]
    fn porcelain_untracked_only_is_clean() {
        let status = parse_porcelain("## main\0?? scratch.lean\0!! target/\0");
        assert!(!status.is_dirty);
        assert_eq!(status.untracked_files, vec!["scratch.lean"]);
    }

    #[test]
    fn porcelain_detached_and_unborn_heads() {
        assert_eq!(parse_porcelain("## HEAD (no branch)\0").branch, None);
        assert_eq!(
            parse_porcelain("## No commits yet on main\0").branch.as_deref(),
            Some("main")
        );
    }

    #[test]
    fn porcelain_rename_source_is_not_a_separate_entry() {
        let status = parse_porcelain("## main\0RM new.rs\0old.rs\0 D with space.txt\0");
        assert_eq!(status.modified_files, vec!["new.rs", "with space.txt"]);
        assert!(status.untracked_files.is_empty());
    }

    #[test]
    fn porcelain_paths_are_verbatim() {
        let status = parse_porcelain("## main\0?? Mathlib/Théorème.lean\0?? \"quoted\".lean\0");
        assert_eq!(
            status.untracked_files,
            vec!["Mathlib/Théorème.lean", "\"quoted\".lean"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn live_git_round_trip() {
        if which::which("git").is_err() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServiceContext::live();
        let live = crate::adapters::live::SystemExecutor;
        let init = CommandSpec::new("git").args(["init", "-q"]).cwd(dir.path());
        assert!(crate::ports::CommandExecutor::run(&live, &init).success());

        let repo = RepoManager::new(&ctx, dir.path()).unwrap();
        repo.write_file("a.txt", "hello", false).unwrap();
        assert_eq!(repo.git_status().unwrap().untracked_files, vec!["a.txt"]);

        // New directories are listed file by file, names unescaped.
        repo.write_file("Mathlib/A.lean", "", false).unwrap();
        repo.write_file("Mathlib/Théorème.lean", "", false).unwrap();
        let mut untracked = repo.git_status().unwrap().untracked_files;
        untracked.sort();
        assert_eq!(
            untracked,
            vec!["Mathlib/A.lean", "Mathlib/Théorème.lean", "a.txt"]
        );
        std::fs::remove_dir_all(dir.path().join("Mathlib")).unwrap();

        repo.git_add(None).unwrap();
        let committed = repo.execute_command(vec![
            "git".to_string(),
            "-c".to_string(),
            "user.name=leanup".to_string(),
            "-c".to_string(),
            "user.email=leanup@example.com".to_string(),
            "-c".to_string(),
            "commit.gpgsign=false".to_string(),
            "commit".to_string(),
            "-qm".to_string(),
            "init".to_string(),
        ]);
        assert!(committed.success(), "{}", committed.stderr);

        repo.write_file("a.txt", "changed", false).unwrap();
        let status = repo.git_status().unwrap();
        assert!(status.branch.is_some());
        assert!(status.is_dirty);
        assert_eq!(status.modified_files, vec!["a.txt"]);
    }
}
