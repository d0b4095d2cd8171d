//! Thin wrappers over the system `git` command
//!
//! Every Git action runs `git` as a subprocess inside the repository
//! directory, so whatever authentication and configuration the user has set
//! up (SSH keys, credential helpers, `~/.gitconfig`) applies unchanged.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::defaults::GIT_MARKER;
use crate::error::{Error, Result};

/// Captured output of a successful `git` invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Combined human-readable output, stdout first.
    pub fn text(&self) -> String {
        let mut text = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        text
    }
}

/// Whether `dir` carries a Git version-control marker.
pub fn has_git_marker(dir: &Path) -> bool {
    dir.join(GIT_MARKER).exists()
}

/// Run `git <args>` in `dir`, failing on a non-zero exit status.
pub fn run(dir: &Path, args: &[&str]) -> Result<GitOutput> {
    let command = args.join(" ");
    debug!("running git {} in {}", command, dir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            dir: dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            dir: dir.to_path_buf(),
            stderr: if stderr.trim().is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            },
        });
    }

    Ok(GitOutput { stdout, stderr })
}

/// Name of the checked-out branch, or `None` for a detached HEAD.
///
/// Works in a freshly initialised repository with no commits yet.
pub fn current_branch(dir: &Path) -> Result<Option<String>> {
    match run(dir, &["symbolic-ref", "--short", "-q", "HEAD"]) {
        Ok(output) => Ok(non_empty(output.stdout)),
        Err(Error::GitCommand { .. }) if has_git_marker(dir) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Whether the working tree has anything `git status --porcelain` reports.
pub fn has_changes(dir: &Path) -> Result<bool> {
    let output = run(dir, &["status", "--porcelain"])?;
    Ok(!output.stdout.trim().is_empty())
}

/// Names of the configured remotes.
pub fn remotes(dir: &Path) -> Result<Vec<String>> {
    let output = run(dir, &["remote"])?;
    Ok(parse_lines(&output.stdout))
}

/// Upstream of `branch` (e.g. `origin/main`), if one is configured.
pub fn upstream(dir: &Path, branch: &str) -> Result<Option<String>> {
    let reference = format!("refs/heads/{}", branch);
    let output = run(
        dir,
        &["for-each-ref", "--format=%(upstream:short)", &reference],
    )?;
    Ok(non_empty(output.stdout))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
