//! # Git Fan-Out
//!
//! Applies one logical Git action to the meta repository and to every
//! registered module that is a Git working tree, collecting an independent
//! outcome per repository. One module failing never stops the others; the
//! caller gets a [`FanOutReport`] and decides what to print.
//!
//! Modules are processed in registration order. With more than one job the
//! module actions run on a bounded `rayon` pool, and the outcomes are still
//! returned in registration order.

use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use rayon::prelude::*;

use crate::config::{Module, Monorepo};
use crate::defaults::DEFAULT_REMOTE;
use crate::error::{Error, Result};
use crate::git;
use crate::repository::GitOperations;

/// Label used for the meta repository in reports
pub const META_REPOSITORY: &str = "meta repository";

/// A Git action that can be fanned out across repositories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitAction {
    Status,
    Add,
    Commit { message: String },
    Push,
    Pull,
    Switch { branch: String, create: bool },
}

impl GitAction {
    /// Short verb for log lines and summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            GitAction::Status => "status",
            GitAction::Add => "add",
            GitAction::Commit { .. } => "commit",
            GitAction::Push => "push",
            GitAction::Pull => "pull",
            GitAction::Switch { .. } => "checkout",
        }
    }

    /// The meta repository never talks to a remote.
    pub fn applies_to_meta(&self) -> bool {
        !matches!(self, GitAction::Push | GitAction::Pull)
    }
}

/// How one repository fared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoStatus {
    Success,
    Skipped(String),
    NoChanges,
    Error(String),
}

/// Outcome of an action in one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOutcome {
    pub name: String,
    pub path: PathBuf,
    pub status: RepoStatus,
    /// Output worth showing to the user, possibly empty.
    pub output: String,
    /// Branch checked out after the action, when it was looked up.
    pub branch: Option<String>,
}

impl RepoOutcome {
    fn skipped(name: &str, path: &Path, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            status: RepoStatus::Skipped(reason.into()),
            output: String::new(),
            branch: None,
        }
    }
}

/// Tally of outcomes by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub success: usize,
    pub skipped: usize,
    pub no_changes: usize,
    pub errors: usize,
}

impl OutcomeCounts {
    fn tally<'a>(outcomes: impl IntoIterator<Item = &'a RepoOutcome>) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome.status {
                RepoStatus::Success => counts.success += 1,
                RepoStatus::Skipped(_) => counts.skipped += 1,
                RepoStatus::NoChanges => counts.no_changes += 1,
                RepoStatus::Error(_) => counts.errors += 1,
            }
        }
        counts
    }
}

/// Per-repository outcomes of one fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutReport {
    pub meta: RepoOutcome,
    /// Module outcomes in registration order.
    pub modules: Vec<RepoOutcome>,
}

impl FanOutReport {
    /// Counts over the meta repository and every module.
    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(std::iter::once(&self.meta).chain(&self.modules))
    }

    /// Counts over modules only.
    pub fn module_counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(&self.modules)
    }

    /// Meta outcome followed by module outcomes.
    pub fn outcomes(&self) -> impl Iterator<Item = &RepoOutcome> {
        std::iter::once(&self.meta).chain(&self.modules)
    }
}

/// Runs Git actions across a monorepo
pub struct Orchestrator<'a> {
    git: &'a dyn GitOperations,
    jobs: usize,
}

impl<'a> Orchestrator<'a> {
    /// `jobs` bounds how many modules are processed at once; 0 and 1 both
    /// mean sequential.
    pub fn new(git: &'a dyn GitOperations, jobs: usize) -> Self {
        Self {
            git,
            jobs: jobs.max(1),
        }
    }

    /// Apply `action` to the meta repository and every module.
    ///
    /// Only failing to start the worker pool is an error; everything that
    /// goes wrong inside a repository is recorded in its outcome.
    pub fn run(&self, repo: &mut Monorepo, action: &GitAction) -> Result<FanOutReport> {
        let meta = if !action.applies_to_meta() {
            RepoOutcome::skipped(META_REPOSITORY, repo.root(), "the meta repository stays local")
        } else if !git::has_git_marker(repo.root()) {
            RepoOutcome::skipped(META_REPOSITORY, repo.root(), "not a Git repository")
        } else {
            self.apply(repo.root(), META_REPOSITORY, action)
        };

        let modules: Vec<RepoOutcome> = if self.jobs == 1 {
            repo.config
                .modules
                .iter()
                .map(|module| self.apply_module(module, action))
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| Error::WorkerPool {
                    message: e.to_string(),
                })?;
            pool.install(|| {
                repo.config
                    .modules
                    .par_iter()
                    .map(|module| self.apply_module(module, action))
                    .collect::<Vec<_>>()
            })
        };

        if matches!(action, GitAction::Switch { .. }) {
            for (module, outcome) in repo.config.modules.iter_mut().zip(&modules) {
                if outcome.branch.is_some() {
                    module.current_branch = outcome.branch.clone();
                }
            }
        }

        Ok(FanOutReport { meta, modules })
    }

    fn apply_module(&self, module: &Module, action: &GitAction) -> RepoOutcome {
        if !git::has_git_marker(&module.absolute_path) {
            warn!("skipping {}: not a Git repository", module.name);
            return RepoOutcome::skipped(
                &module.name,
                &module.absolute_path,
                "not a Git repository",
            );
        }
        self.apply(&module.absolute_path, &module.name, action)
    }

    fn apply(&self, dir: &Path, name: &str, action: &GitAction) -> RepoOutcome {
        debug!("running {} in {} ({})", action.verb(), name, dir.display());
        match self.execute(dir, action) {
            Ok((status, output, branch)) => RepoOutcome {
                name: name.to_string(),
                path: dir.to_path_buf(),
                status,
                output,
                branch,
            },
            Err(e) => {
                error!("{} failed in {}: {}", action.verb(), name, e);
                RepoOutcome {
                    name: name.to_string(),
                    path: dir.to_path_buf(),
                    status: RepoStatus::Error(e.to_string()),
                    output: String::new(),
                    branch: None,
                }
            }
        }
    }

    fn execute(
        &self,
        dir: &Path,
        action: &GitAction,
    ) -> Result<(RepoStatus, String, Option<String>)> {
        match action {
            GitAction::Status => {
                let branch = self.git.current_branch(dir)?;
                let output = self.git.status(dir)?;
                Ok((RepoStatus::Success, output, branch))
            }
            GitAction::Add => {
                let output = self.git.add_all(dir)?;
                Ok((RepoStatus::Success, output, None))
            }
            GitAction::Commit { message } => {
                if !self.git.has_changes(dir)? {
                    return Ok((RepoStatus::NoChanges, String::new(), None));
                }
                let output = self.git.commit(dir, message)?;
                Ok((RepoStatus::Success, output, None))
            }
            GitAction::Push => {
                if !self.has_origin(dir)? {
                    return Ok((skip_no_origin(), String::new(), None));
                }
                let Some(branch) = self.git.current_branch(dir)? else {
                    return Ok((
                        RepoStatus::Skipped("no branch checked out".to_string()),
                        String::new(),
                        None,
                    ));
                };
                let set_upstream = self.git.upstream(dir, &branch)?.is_none();
                let output = self.git.push(dir, DEFAULT_REMOTE, &branch, set_upstream)?;
                Ok((RepoStatus::Success, output, Some(branch)))
            }
            GitAction::Pull => {
                if !self.has_origin(dir)? {
                    return Ok((skip_no_origin(), String::new(), None));
                }
                let output = self.git.pull(dir)?;
                Ok((RepoStatus::Success, output, None))
            }
            GitAction::Switch { branch, create } => {
                let output = self.git.checkout(dir, branch, *create)?;
                let current = self.git.current_branch(dir)?;
                Ok((RepoStatus::Success, output, current))
            }
        }
    }

    fn has_origin(&self, dir: &Path) -> Result<bool> {
        Ok(self
            .git
            .remotes(dir)?
            .iter()
            .any(|remote| remote == DEFAULT_REMOTE))
    }
}

fn skip_no_origin() -> RepoStatus {
    RepoStatus::Skipped(format!("no '{}' remote configured", DEFAULT_REMOTE))
}
