//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `leanup`.
#[derive(Debug, Parser)]
#[command(name = "leanup", version, about = "Install and manage elan, the Lean toolchain manager")]
pub struct Cli {
    /// Enable debug logging. Must precede the subcommand so that `elan -v` reaches elan.
    #[arg(short, long)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install elan.
    Install {
        /// Version to request (informational; the installer fetches its default release).
        version: Option<String>,
        /// Run the installer even if elan is already installed.
        #[arg(short, long)]
        force: bool,
    },
    /// Run elan with the given arguments.
    #[command(disable_help_flag = true)]
    Elan {
        /// Arguments passed to elan unchanged.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show elan installation status.
    Status {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the leanup version.
    Version,
    /// Work with a git checkout.
    Repo {
        /// Working directory (defaults to the current directory).
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Repository action.
        #[command(subcommand)]
        action: RepoAction,
    },
}

/// `leanup repo` actions.
#[derive(Debug, Subcommand)]
pub enum RepoAction {
    /// Clone a repository into the working directory.
    Clone {
        /// Repository URL.
        url: String,
        /// Branch to check out.
        #[arg(long)]
        branch: Option<String>,
        /// Create a shallow clone with this many commits.
        #[arg(long)]
        depth: Option<u32>,
    },
    /// Show branch and changed files.
    Status {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Stage paths, or everything when none are given.
    Add {
        /// Paths to stage.
        paths: Vec<String>,
    },
    /// Commit staged changes.
    Commit {
        /// Commit message.
        #[arg(short, long)]
        message: String,
    },
    /// Pull from a remote.
    Pull {
        /// Remote name.
        #[arg(long, default_value = "origin")]
        remote: String,
        /// Branch to pull; uses the upstream when omitted.
        #[arg(long)]
        branch: Option<String>,
    },
    /// Push to a remote.
    Push {
        /// Remote name.
        #[arg(long, default_value = "origin")]
        remote: String,
        /// Branch to push; uses the upstream when omitted.
        #[arg(long)]
        branch: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, RepoAction};
    use clap::Parser;

    #[test]
    fn parses_install_with_version_and_force() {
        let cli = Cli::parse_from(["leanup", "install", "v4.0.0", "-f"]);
        match cli.command {
            Command::Install { version, force } => {
                assert_eq!(version.as_deref(), Some("v4.0.0"));
                assert!(force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn elan_arguments_pass_through_untouched() {
        let cli = Cli::parse_from([
            "leanup", "elan", "toolchain", "install", "--help", "-v", "stable",
        ]);
        match cli.command {
            Command::Elan { args } => {
                assert_eq!(args, vec!["toolchain", "install", "--help", "-v", "stable"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn elan_accepts_leading_flags() {
        let cli = Cli::parse_from(["leanup", "elan", "--version"]);
        assert!(matches!(cli.command, Command::Elan { ref args } if args == &["--version"]));
    }

    #[test]
    fn verbose_precedes_subcommand() {
        let cli = Cli::parse_from(["leanup", "--verbose", "status"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Status { json: false }));
    }

    #[test]
    fn elan_keeps_its_own_short_flags() {
        let cli = Cli::parse_from(["leanup", "elan", "-v", "show"]);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Command::Elan { ref args } if args == &["-v", "show"]));
    }

    #[test]
    fn parses_repo_actions() {
        let cli = Cli::parse_from(["leanup", "repo", "--dir", "/tmp/x", "commit", "-m", "msg"]);
        match cli.command {
            Command::Repo { dir, action: RepoAction::Commit { message } } => {
                assert_eq!(dir, std::path::PathBuf::from("/tmp/x"));
                assert_eq!(message, "msg");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["leanup", "repo", "pull", "--branch", "main"]);
        assert!(matches!(
            cli.command,
            Command::Repo { action: RepoAction::Pull { ref remote, branch: Some(ref b) }, .. }
                if remote == "origin" && b == "main"
        ));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["leanup", "unknown"]).is_err());
    }
}
