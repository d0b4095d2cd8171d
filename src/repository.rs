//! # Repository Operations Seam
//!
//! The orchestrator, the branch-consistency checker and `init` never spawn
//! `git` directly. They go through the [`GitOperations`] trait so that tests
//! can substitute an in-memory implementation and exercise fan-out logic
//! without a Git binary.
//!
//! [`DefaultGitOperations`] is the production implementation; each method
//! is one `git` invocation in the given working tree via [`crate::git`].

use std::path::Path;

use crate::error::Result;
use crate::git;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Branch checked out in `dir`, `None` when HEAD is detached.
    fn current_branch(&self, dir: &Path) -> Result<Option<String>>;

    /// Human-readable `git status` output.
    fn status(&self, dir: &Path) -> Result<String>;

    /// Whether the working tree has staged, unstaged or untracked changes.
    fn has_changes(&self, dir: &Path) -> Result<bool>;

    /// Stage every change in the working tree.
    fn add_all(&self, dir: &Path) -> Result<String>;

    /// Stage specific paths.
    fn add_paths(&self, dir: &Path, paths: &[&str]) -> Result<()>;

    /// Commit staged changes with `message`.
    fn commit(&self, dir: &Path, message: &str) -> Result<String>;

    /// Names of the configured remotes.
    fn remotes(&self, dir: &Path) -> Result<Vec<String>>;

    /// Upstream tracking branch of `branch`, if any.
    fn upstream(&self, dir: &Path, branch: &str) -> Result<Option<String>>;

    /// Push `branch` to `remote`, establishing the upstream when asked.
    fn push(&self, dir: &Path, remote: &str, branch: &str, set_upstream: bool) -> Result<String>;

    /// Pull the current branch from its upstream.
    fn pull(&self, dir: &Path) -> Result<String>;

    /// Check out `branch`, creating it first when `create` is set.
    fn checkout(&self, dir: &Path, branch: &str, create: bool) -> Result<String>;

    /// Initialise a new repository in `dir`.
    fn init(&self, dir: &Path) -> Result<()>;
}

/// Default implementation that shells out to the system `git`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn current_branch(&self, dir: &Path) -> Result<Option<String>> {
        git::current_branch(dir)
    }

    fn status(&self, dir: &Path) -> Result<String> {
        Ok(git::run(dir, &["status"])?.text())
    }

    fn has_changes(&self, dir: &Path) -> Result<bool> {
        git::has_changes(dir)
    }

    fn add_all(&self, dir: &Path) -> Result<String> {
        Ok(git::run(dir, &["add", "."])?.text())
    }

    fn add_paths(&self, dir: &Path, paths: &[&str]) -> Result<()> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        git::run(dir, &args)?;
        Ok(())
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<String> {
        Ok(git::run(dir, &["commit", "-m", message])?.text())
    }

    fn remotes(&self, dir: &Path) -> Result<Vec<String>> {
        git::remotes(dir)
    }

    fn upstream(&self, dir: &Path, branch: &str) -> Result<Option<String>> {
        git::upstream(dir, branch)
    }

    fn push(&self, dir: &Path, remote: &str, branch: &str, set_upstream: bool) -> Result<String> {
        let output = if set_upstream {
            git::run(dir, &["push", "--set-upstream", remote, branch])?
        } else {
            git::run(dir, &["push", remote, branch])?
        };
        Ok(output.text())
    }

    fn pull(&self, dir: &Path) -> Result<String> {
        Ok(git::run(dir, &["pull"])?.text())
    }

    fn checkout(&self, dir: &Path, branch: &str, create: bool) -> Result<String> {
        let output = if create {
            git::run(dir, &["checkout", "-b", branch])?
        } else {
            git::run(dir, &["checkout", branch])?
        };
        Ok(output.text())
    }

    fn init(&self, dir: &Path) -> Result<()> {
        git::run(dir, &["init", "-q"])?;
        Ok(())
    }
}
