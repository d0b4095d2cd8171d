//! Branch consistency between the meta repository and its modules.
//!
//! The check is advisory. [`with_validation`] warns about mismatched
//! branches and then runs the action anyway, and a check that could not be
//! carried out counts as consistent. Callers that need to tell "verified"
//! from "could not verify" use [`check_branch_consistency`] directly.

use log::warn;

use crate::config::Monorepo;
use crate::git;
use crate::repository::GitOperations;

/// Result of comparing module branches against the meta repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchConsistency {
    /// Every module that is a Git working tree is on `branch`.
    Consistent { branch: String },
    /// Some modules are on a different branch than `reference`.
    Inconsistent {
        reference: String,
        /// `(module, branch)` pairs that differ from the reference.
        mismatched: Vec<(String, String)>,
    },
    /// The branches could not be determined.
    Unverified { reason: String },
}

/// Stand-in branch name for a module with a detached HEAD.
pub const DETACHED: &str = "(detached)";

/// Compare every module's branch with the meta repository's branch.
///
/// Branches cached by a branch switch earlier in this process are used
/// instead of asking Git again. Modules that are not Git working trees are
/// ignored; a module with a detached HEAD is reported as `(detached)`.
pub fn check_branch_consistency(repo: &Monorepo, git: &dyn GitOperations) -> BranchConsistency {
    if !git::has_git_marker(repo.root()) {
        return BranchConsistency::Unverified {
            reason: "the meta repository is not a Git repository".to_string(),
        };
    }

    let reference = match git.current_branch(repo.root()) {
        Ok(Some(branch)) => branch,
        Ok(None) => {
            return BranchConsistency::Unverified {
                reason: "the meta repository has no branch checked out".to_string(),
            }
        }
        Err(e) => {
            return BranchConsistency::Unverified {
                reason: e.to_string(),
            }
        }
    };

    let mut mismatched = Vec::new();
    for module in &repo.config.modules {
        if !git::has_git_marker(&module.absolute_path) {
            continue;
        }

        let branch = match &module.current_branch {
            Some(cached) => Some(cached.clone()),
            None => match git.current_branch(&module.absolute_path) {
                Ok(branch) => branch,
                Err(e) => {
                    return BranchConsistency::Unverified {
                        reason: format!("could not read branch of {}: {}", module.name, e),
                    }
                }
            },
        };

        match branch {
            Some(branch) if branch == reference => {}
            Some(branch) => mismatched.push((module.name.clone(), branch)),
            None => mismatched.push((module.name.clone(), DETACHED.to_string())),
        }
    }

    if mismatched.is_empty() {
        BranchConsistency::Consistent { branch: reference }
    } else {
        BranchConsistency::Inconsistent {
            reference,
            mismatched,
        }
    }
}

/// Whether all modules are on the meta repository's branch.
///
/// Warns about every mismatched module. A check that could not be carried
/// out is logged and reported as consistent.
pub fn validate_branch_consistency(repo: &Monorepo, git: &dyn GitOperations) -> bool {
    match check_branch_consistency(repo, git) {
        BranchConsistency::Consistent { .. } => true,
        BranchConsistency::Inconsistent {
            reference,
            mismatched,
        } => {
            warn!("Not all repositories are on the same branch.");
            warn!(
                "Meta repository is on branch '{}', but these modules are on different branches:",
                reference
            );
            for (module, branch) in &mismatched {
                warn!("  - {} (on branch {})", module, branch);
            }
            false
        }
        BranchConsistency::Unverified { reason } => {
            warn!("could not verify branch consistency: {}", reason);
            true
        }
    }
}

/// Run `action` on `repo` after an advisory branch consistency check.
pub fn with_validation<T>(
    repo: &mut Monorepo,
    git: &dyn GitOperations,
    action: impl FnOnce(&mut Monorepo) -> T,
) -> T {
    if !validate_branch_consistency(repo, git) {
        warn!("continuing despite inconsistent branches");
    }
    action(repo)
}
