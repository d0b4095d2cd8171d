//! Host filesystem helpers for deduplicated links
//!
//! The link engine and the audit engine only ever touch the disk through
//! these functions: atomic document writes, hardlinks that replace an
//! existing regular file, storage identity checks, and deterministic file
//! enumeration under a directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::defaults::GIT_MARKER;
use crate::error::{Error, Result};

/// Write `contents` to `path` so readers never observe a partial file.
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over the destination. The destination keeps its permissions; a
/// new file gets mode 0644 instead of the private mode of temporary files.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    let permissions = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Create `dir` and all missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        debug!("creating directory {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Whether anything (file, directory or dangling symlink) exists at `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Hardlink `dest` to `master`, replacing a regular file already at `dest`.
///
/// If `dest` already shares storage with `master` nothing is done. Any error
/// other than "already exists" propagates, as does a failure to remove the
/// existing entry (for example when it is a directory).
pub fn hard_link_replacing(master: &Path, dest: &Path) -> Result<()> {
    let link_err = |source: io::Error| Error::Link {
        src: master.to_path_buf(),
        dst: dest.to_path_buf(),
        source,
    };

    match fs::hard_link(master, dest) {
        Ok(()) => {
            debug!("hardlinked {} -> {}", dest.display(), master.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if same_file(master, dest).map_err(link_err)? {
                return Ok(());
            }
            debug!("replacing {} with a hardlink", dest.display());
            fs::remove_file(dest).map_err(link_err)?;
            fs::hard_link(master, dest).map_err(link_err)
        }
        Err(e) => Err(link_err(e)),
    }
}

/// Copy `src` to `dest`, creating parent directories.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    ensure_parent(dest)?;
    fs::copy(src, dest).map_err(|source| Error::Link {
        src: src.to_path_buf(),
        dst: dest.to_path_buf(),
        source,
    })?;
    debug!("copied {} -> {}", src.display(), dest.display());
    Ok(())
}

/// Whether two paths refer to the same underlying storage unit.
#[cfg(unix)]
pub fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let (ma, mb) = (fs::metadata(a)?, fs::metadata(b)?);
    Ok(ma.dev() == mb.dev() && ma.ino() == mb.ino())
}

/// Whether two paths refer to the same underlying storage unit.
///
/// Without stable inode access this falls back to comparing size and
/// content, which cannot tell a broken hardlink from an identical copy.
#[cfg(not(unix))]
pub fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    let (ma, mb) = (fs::metadata(a)?, fs::metadata(b)?);
    if ma.len() != mb.len() {
        return Ok(false);
    }
    Ok(fs::read(a)? == fs::read(b)?)
}

/// List every non-directory entry under `dir`, relative to `dir`.
///
/// Entries are sorted by file name at each level so callers see a stable
/// order. `.git` directories are not descended into.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == GIT_MARKER));

    for entry in walker {
        let entry = entry.map_err(|e| {
            Error::Io(
                e.into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop detected")),
            )
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            files.push(relative.to_path_buf());
        }
    }

    Ok(files)
}
