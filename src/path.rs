//! Path resolution utilities for the virtual monorepo
//!
//! Everything here is lexical: paths are made absolute against the process
//! working directory and `.`/`..` components are folded without touching the
//! filesystem, except for [`find_root`] which searches for the configuration
//! document.

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::defaults::{CONFIG_FILENAME, MASTER_COPY_SEPARATOR};
use crate::error::Result;

/// Resolve a path against the current working directory.
///
/// Absolute paths pass through (normalized); relative paths are joined onto
/// the working directory. The path does not need to exist.
pub fn resolve<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    Ok(resolve_from(&cwd, path))
}

/// Resolve a path against an explicit base directory.
pub fn resolve_from<P: AsRef<Path>>(base: &Path, path: P) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// `..` at the filesystem root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Locate the monorepo root by walking up from `start`.
///
/// Returns the first directory containing the configuration document, or
/// `None` once the filesystem root has been checked. `start` defaults to the
/// current working directory.
pub fn find_root(start: Option<&Path>) -> Result<Option<PathBuf>> {
    let start = match start {
        Some(path) => resolve(path)?,
        None => env::current_dir()?,
    };

    Ok(start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILENAME).is_file())
        .map(Path::to_path_buf))
}

/// Compute `target` relative to `base`.
///
/// Both paths are expected to be absolute. When they share no prefix (for
/// example different drives on Windows) the normalized target is returned.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = normalize(base);
    let target = normalize(target);

    let base_parts: Vec<Component> = base.components().collect();
    let target_parts: Vec<Component> = target.components().collect();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return target;
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

/// Render a relative path with `/` separators, the form stored in the
/// configuration document on every platform.
pub fn to_portable(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Turn a stored `/`-separated relative path back into a native path.
pub fn from_portable(path: &str) -> PathBuf {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Build the filesystem-safe identifier of a master copy.
///
/// The identifier is `<module>__<path>` with both path separators replaced
/// by `_`, so it always names a single entry inside the links directory.
pub fn master_copy_name(module: &str, path_in_module: &str) -> String {
    let sanitized: String = path_in_module
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{}{}{}", module, MASTER_COPY_SEPARATOR, sanitized)
}
