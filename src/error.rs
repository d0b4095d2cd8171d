//! # Error Handling
//!
//! This module defines the centralized error type for the virtual monorepo
//! library. It uses `thiserror` to build a single `Error` enum covering every
//! precondition a command can violate, plus wrapped I/O and JSON failures.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failure modes. Structural failures
//!   (`NotInitialized`, `CorruptConfig`, `LockHeld`) abort a whole command;
//!   the rest are raised by a single module, file or link record and may be
//!   tallied by multi-item operations instead of propagated.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Variants with a standard remedy render an extra `hint:` line so the
//! binaries can print the error as-is.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for virtual monorepo operations
#[derive(Error, Debug)]
pub enum Error {
    /// No configuration document was found in the start directory or any
    /// of its ancestors.
    #[error("Monorepo not initialized (searched from {})\n  hint: Run 'mono init' first", start.display())]
    NotInitialized { start: PathBuf },

    /// `init` was called inside an existing monorepo.
    #[error("Directory is already part of a monorepo at: {}", root.display())]
    AlreadyInitialized { root: PathBuf },

    /// The configuration document could not be parsed.
    #[error("Failed to parse monorepo config {}: {message}{}", path.display(), hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    CorruptConfig {
        path: PathBuf,
        message: String,
        /// Optional hint for how to fix the document
        hint: Option<String>,
    },

    /// A path handed to a command does not exist.
    #[error("Path does not exist: {}", path.display())]
    PathNotFound { path: PathBuf },

    /// A module with the same name is already registered.
    #[error("Module with name '{name}' already exists in the monorepo\n  hint: Pass --name to register it under a different name")]
    DuplicateModule { name: String },

    /// A module name that cannot be used as a master copy prefix.
    #[error("Invalid module name '{name}': names must not be empty, '.' or '..', or contain path separators\n  hint: Pass --name to choose a different name")]
    InvalidModuleName { name: String },

    /// No module with the given name is registered.
    #[error("Module '{name}' not found in the monorepo\n  hint: Run 'mono list' to see registered modules")]
    ModuleNotFound { name: String },

    /// A path lies outside every registered module.
    #[error("Path {} is not in any module of the monorepo", path.display())]
    PathNotInModule { path: PathBuf },

    /// Source and target of a link resolve into the same module.
    #[error("Source and target must be in different modules (both are in '{module}')")]
    SameModule { module: String },

    /// The source of a link does not exist.
    #[error("Source path {} does not exist", path.display())]
    SourceNotFound { path: PathBuf },

    /// The cooperative lock is held by another invocation.
    #[error("Monorepo is locked by another process (pid {}, since {})\n  hint: If no other mono process is running, clear it with 'mono unlock'",
        pid.map(|p| p.to_string()).unwrap_or_else(|| "unknown".to_string()),
        since.as_deref().unwrap_or("unknown"))]
    LockHeld {
        pid: Option<u32>,
        since: Option<String>,
    },

    /// The link target already belongs to a different link record.
    #[error("Cannot link to {module}/{path}: it already belongs to the link of {owner}")]
    LinkConflict {
        module: String,
        path: String,
        /// `<module>/<path>` of the owning record's source
        owner: String,
    },

    /// The master copy backing an existing link record is gone.
    #[error("Master copy '{name}' is missing\n  hint: Run 'mono check' to regenerate it from the link source")]
    MasterCopyMissing { name: String },

    /// A hardlink or copy between two paths failed.
    #[error("Failed to link {} -> {}: {source}", src.display(), dst.display())]
    Link {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every item of a multi-item operation failed.
    #[error("{message}")]
    NothingProcessed { message: String },

    /// A `git` invocation exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {}: git {command} - {stderr}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// A bounded worker pool could not be created.
    #[error("Failed to start worker pool: {message}")]
    WorkerPool { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error prevents a command from starting at all.
    ///
    /// Multi-item operations propagate these immediately instead of
    /// recording them in a per-item tally.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::NotInitialized { .. } | Error::CorruptConfig { .. } | Error::LockHeld { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
