//! Cooperative, file-based mutual exclusion for mutating operations
//!
//! The lock is a small JSON side-file at the monorepo root. Acquiring it
//! flips `locked` to true and records who took it; releasing flips it back.
//! There is no expiry and the stored pid is informational only, so a holder
//! that dies without releasing leaves the lock held until `mono unlock`.
//!
//! [`acquire`] returns a [`LockGuard`]. Call [`LockGuard::release`] on the
//! success path to surface write errors; every other exit path (early `?`
//! return or panic unwinding) releases the lock from `Drop`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::defaults::LOCKFILE_FILENAME;
use crate::error::{Error, Result};
use crate::filesystem;

/// Contents of the lockfile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Whether an operation currently holds the lock.
    pub locked: bool,
    /// ISO-8601 time the lock was last acquired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Process id of the last holder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl LockRecord {
    fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        filesystem::write_atomic(path, json.as_bytes())
    }
}

/// Read the lock record at `root`.
///
/// An absent or unparsable lockfile reads as unlocked.
pub fn read(root: &Path) -> LockRecord {
    let path = root.join(LOCKFILE_FILENAME);
    match fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring unreadable lockfile {}: {}", path.display(), e);
            LockRecord::default()
        }),
        Err(_) => LockRecord::default(),
    }
}

/// Write a fresh, unlocked lockfile at `root`.
pub fn initialize(root: &Path) -> Result<()> {
    LockRecord::default().write(&root.join(LOCKFILE_FILENAME))
}

/// Acquire the monorepo lock at `root`.
///
/// Fails with `LockHeld` if the lockfile says another operation holds it.
pub fn acquire(root: &Path) -> Result<LockGuard> {
    let path = root.join(LOCKFILE_FILENAME);
    let current = read(root);
    if current.locked {
        return Err(Error::LockHeld {
            pid: current.pid,
            since: current.timestamp,
        });
    }

    let record = LockRecord {
        locked: true,
        timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        pid: Some(std::process::id()),
    };
    record.write(&path)?;
    debug!("acquired lock {}", path.display());

    Ok(LockGuard {
        path,
        record,
        released: false,
    })
}

/// Clear the lock regardless of who holds it.
///
/// Returns the record that was cleared when the lock was held.
pub fn force_unlock(root: &Path) -> Result<Option<LockRecord>> {
    let current = read(root);
    if !current.locked {
        return Ok(None);
    }

    let cleared = LockRecord {
        locked: false,
        ..current.clone()
    };
    cleared.write(&root.join(LOCKFILE_FILENAME))?;
    warn!(
        "force-cleared lock held by pid {:?} since {:?}",
        current.pid, current.timestamp
    );
    Ok(Some(current))
}

/// Scoped ownership of the monorepo lock
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    record: LockRecord,
    released: bool,
}

impl LockGuard {
    /// Release the lock, reporting any failure to write the lockfile.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.write_unlocked()
    }

    fn write_unlocked(&self) -> Result<()> {
        let record = LockRecord {
            locked: false,
            ..self.record.clone()
        };
        record.write(&self.path)?;
        debug!("released lock {}", self.path.display());
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.write_unlocked() {
            error!("failed to release lock {}: {}", self.path.display(), e);
        }
    }
}
