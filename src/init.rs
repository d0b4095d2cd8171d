//! Creating a new monorepo root.
//!
//! Besides the configuration document, links directory and lockfile, `init`
//! sets up a meta repository at the root that tracks only the configuration
//! document. Failing to set up the meta repository is reported in the
//! [`InitReport`] and never fails the initialisation itself.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::{Monorepo, MonorepoConfig};
use crate::defaults::{
    CONFIG_FILENAME, GITIGNORE_FILENAME, LINKS_DIRNAME, LOCKFILE_FILENAME,
    META_INIT_COMMIT_MESSAGE,
};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::git;
use crate::lock;
use crate::path;
use crate::repository::GitOperations;

/// State of the meta repository after `init`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaRepository {
    /// A new repository was created and the configuration committed.
    Created,
    /// The root already was a Git repository and was left alone.
    AlreadyPresent,
    /// Setting up the repository failed.
    Failed(String),
}

/// What `init` created
#[derive(Debug, Clone)]
pub struct InitReport {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub links_dir: PathBuf,
    pub lockfile: PathBuf,
    pub meta: MetaRepository,
}

/// Default monorepo name for `dir`: its final path component.
pub fn default_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "monorepo".to_string())
}

/// Initialise a monorepo rooted at `dir`, creating the directory if needed.
///
/// Fails with `AlreadyInitialized` when `dir` or any ancestor already holds
/// a configuration document.
pub fn init(
    dir: &Path,
    name: Option<&str>,
    description: Option<&str>,
    git: &dyn GitOperations,
) -> Result<(Monorepo, InitReport)> {
    let root = path::resolve(dir)?;
    if let Some(existing) = path::find_root(Some(&root))? {
        return Err(Error::AlreadyInitialized { root: existing });
    }
    filesystem::ensure_dir(&root)?;

    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| default_name(&root));
    let config = MonorepoConfig::new(name, description.map(str::to_string));

    let config_path = root.join(CONFIG_FILENAME);
    filesystem::write_atomic(&config_path, config.to_json()?.as_bytes())?;
    let links_dir = root.join(LINKS_DIRNAME);
    filesystem::ensure_dir(&links_dir)?;
    lock::initialize(&root)?;
    info!("initialized monorepo '{}' at {}", config.name, root.display());

    let meta = if git::has_git_marker(&root) {
        debug!("{} is already a Git repository", root.display());
        MetaRepository::AlreadyPresent
    } else {
        match init_meta_repository(&root, git) {
            Ok(()) => MetaRepository::Created,
            Err(e) => {
                warn!("failed to initialize meta repository: {}", e);
                MetaRepository::Failed(e.to_string())
            }
        }
    };

    ensure_gitignore(
        &root,
        &[LINKS_DIRNAME.to_string(), format!("!{}", LOCKFILE_FILENAME)],
    )?;

    let report = InitReport {
        config_path,
        links_dir,
        lockfile: root.join(LOCKFILE_FILENAME),
        meta,
        root: root.clone(),
    };
    Ok((Monorepo::new(root, config), report))
}

fn init_meta_repository(root: &Path, git: &dyn GitOperations) -> Result<()> {
    git.init(root)?;
    ensure_gitignore(root, &["*".to_string(), format!("!{}", CONFIG_FILENAME)])?;
    git.add_paths(root, &[CONFIG_FILENAME])?;
    git.commit(root, META_INIT_COMMIT_MESSAGE)?;
    info!("initialized meta repository in {}", root.display());
    Ok(())
}

/// Append the `entries` missing from the root `.gitignore`.
///
/// Existing content is kept as-is; the file is created when absent.
pub fn ensure_gitignore(root: &Path, entries: &[String]) -> Result<()> {
    let gitignore = root.join(GITIGNORE_FILENAME);
    let mut content = match fs::read_to_string(&gitignore) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let missing: Vec<&String> = entries
        .iter()
        .filter(|entry| !content.lines().any(|line| line.trim() == entry.as_str()))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for entry in missing {
        content.push_str(entry);
        content.push('\n');
    }
    filesystem::write_atomic(&gitignore, content.as_bytes())
}
