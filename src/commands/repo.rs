//! `leanup repo` command.

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::RepoAction;
use crate::context::ServiceContext;
use crate::repo::{GitStatus, RepoManager};

/// Execute a `repo` action in `dir`.
///
/// # Errors
///
/// Returns an error string if the directory cannot be resolved or the git
/// operation fails.
pub fn run(ctx: &ServiceContext, dir: &Path, action: &RepoAction) -> Result<ExitCode, String> {
    let mut repo = RepoManager::new(ctx, dir).map_err(|e| e.to_string())?;
    match action {
        RepoAction::Clone { url, branch, depth } => {
            repo.clone_from(url, branch.as_deref(), *depth).map_err(|e| e.to_string())?;
            println!("Cloned {url} into {}", repo.cwd().display());
        }
        RepoAction::Status { json } => {
            let status = repo.git_status().map_err(|e| e.to_string())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&status).map_err(|e| e.to_string())?);
            } else {
                print!("{}", render(&status));
            }
        }
        RepoAction::Add { paths } => {
            let paths = (!paths.is_empty()).then_some(paths.as_slice());
            repo.git_add(paths).map_err(|e| e.to_string())?;
            println!("Changes staged.");
        }
        RepoAction::Commit { message } => {
            repo.git_commit(message).map_err(|e| e.to_string())?;
            println!("Changes committed.");
        }
        RepoAction::Pull { remote, branch } => {
            repo.git_pull(remote, branch.as_deref()).map_err(|e| e.to_string())?;
            println!("Pulled from {remote}.");
        }
        RepoAction::Push { remote, branch } => {
            repo.git_push(remote, branch.as_deref()).map_err(|e| e.to_string())?;
            println!("Pushed to {remote}.");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn render(status: &GitStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Branch: {}",
        status.branch.as_deref().unwrap_or("(detached)")
    );
    let _ = writeln!(out, "Dirty: {}", if status.is_dirty { "yes" } else { "no" });
    for (label, files) in [
        ("Modified", &status.modified_files),
        ("Untracked", &status.untracked_files),
    ] {
        if files.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{label} ({}):", files.len());
        for file in files {
            let _ = writeln!(out, "   {file}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_detached_clean_status() {
        let text = render(&GitStatus::default());
        assert_eq!(text, "Branch: (detached)\nDirty: no\n");
    }

    #[test]
    fn renders_changed_files() {
        let status = GitStatus {
            branch: Some("main".into()),
            is_dirty: true,
            untracked_files: vec!["new.lean".into()],
            modified_files: vec!["Main.lean".into()],
        };
        assert_eq!(
            render(&status),
            "Branch: main\nDirty: yes\nModified (1):\n   Main.lean\nUntracked (1):\n   new.lean\n"
        );
    }
}
