//! Module registry: adding, removing and describing modules.

use std::fmt::Write as _;
use std::path::Path;

use log::{info, warn};

use crate::config::{Module, Monorepo};
use crate::error::{Error, Result};
use crate::lock;
use crate::path;

/// Outcome of removing a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedModule {
    pub module: Module,
    /// Link records that still reference the removed module.
    pub dangling_links: usize,
}

/// Register the directory at `module_path` as a module.
///
/// The name defaults to the final component of the resolved path.
pub fn add_module(
    repo: &mut Monorepo,
    module_path: &Path,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Module> {
    let absolute = path::resolve(module_path)?;
    if !absolute.exists() {
        return Err(Error::PathNotFound { path: absolute });
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::PathNotFound {
                path: absolute.clone(),
            })?,
    };
    validate_name(&name)?;

    let guard = lock::acquire(repo.root())?;

    if repo.config.module(&name).is_some() {
        return Err(Error::DuplicateModule { name });
    }

    let relative = path::to_portable(&path::relative_path(repo.root(), &absolute));
    let module = Module {
        name,
        relative_path: if relative.is_empty() {
            ".".to_string()
        } else {
            relative
        },
        description: description.map(str::to_string),
        absolute_path: absolute,
        current_branch: None,
    };

    repo.config.modules.push(module.clone());
    repo.save()?;
    guard.release()?;

    info!(
        "added module '{}' at {}",
        module.name,
        module.absolute_path.display()
    );
    Ok(module)
}

/// Reject names that would escape the links directory once used as a
/// master copy prefix.
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(Error::InvalidModuleName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Unregister the module called `name`.
///
/// Link records referencing the module are left in place; `mono check`
/// drops the endpoints that can no longer be resolved.
pub fn remove_module(repo: &mut Monorepo, name: &str) -> Result<RemovedModule> {
    let guard = lock::acquire(repo.root())?;

    let index = repo
        .config
        .modules
        .iter()
        .position(|m| m.name == name)
        .ok_or_else(|| Error::ModuleNotFound {
            name: name.to_string(),
        })?;

    let module = repo.config.modules.remove(index);
    let dangling_links = repo
        .config
        .links
        .iter()
        .filter(|record| record.references_module(name))
        .count();

    repo.save()?;
    guard.release()?;

    info!("removed module '{}'", name);
    if dangling_links > 0 {
        warn!(
            "{} link record(s) still reference removed module '{}'",
            dangling_links, name
        );
    }

    Ok(RemovedModule {
        module,
        dangling_links,
    })
}

/// Human-readable listing of every module with its resolved path.
pub fn describe_modules(repo: &Monorepo) -> String {
    let modules = &repo.config.modules;
    if modules.is_empty() {
        return "No modules registered".to_string();
    }

    let mut out = format!("Modules in {}:\n", repo.config.name);
    for module in modules {
        let _ = write!(
            out,
            "\n  {}\n    path: {}",
            module.name,
            module.absolute_path.display()
        );
        if let Some(description) = &module.description {
            let _ = write!(out, "\n    description: {}", description);
        }
        out.push('\n');
    }
    out
}
