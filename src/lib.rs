//! # Virtual Monorepo Library
//!
//! This library lets a set of independently versioned Git repositories be
//! managed as modules of one "virtual" monorepo. It backs the `mono` and
//! `mgit` command-line tools but can be used directly.
//!
//! ## Quick Example
//!
//! ```no_run
//! use virtual_monorepo::config::Monorepo;
//! use virtual_monorepo::orchestrator::{GitAction, Orchestrator};
//! use virtual_monorepo::repository::DefaultGitOperations;
//!
//! # fn main() -> virtual_monorepo::error::Result<()> {
//! let mut repo = Monorepo::load()?;
//! let report = Orchestrator::new(&DefaultGitOperations, 1).run(&mut repo, &GitAction::Status)?;
//! let counts = report.counts();
//! println!("{} ok, {} skipped, {} errors", counts.success, counts.skipped, counts.errors);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The `.monorepo.json` document at the
//!   monorepo root listing modules and link records, located by walking up
//!   from the working directory (`path`).
//! - **Lock (`lock`)**: A cooperative lockfile that serialises mutating
//!   operations across processes.
//! - **Modules (`registry`)**: Registering and unregistering working trees.
//! - **Links (`links`, `filesystem`)**: Deduplicating files across modules
//!   through hardlinks to a master copy in `.monorepo-links/`.
//! - **Audit (`audit`)**: Detecting and repairing broken links.
//! - **Git fan-out (`orchestrator`, `consistency`, `repository`, `git`)**:
//!   Running one Git action in the meta repository and every module, with
//!   per-repository outcomes.
//! - **Initialisation (`init`)**: Creating a monorepo root and its meta
//!   repository.

pub mod audit;
pub mod config;
pub mod consistency;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod init;
pub mod links;
pub mod lock;
pub mod orchestrator;
pub mod output;
pub mod path;
pub mod registry;
pub mod repository;

#[cfg(test)]
mod path_proptest;
