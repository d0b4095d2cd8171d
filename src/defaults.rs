//! Default names and values shared across the monorepo library.
//!
//! This module centralizes the on-disk names that make up a monorepo root,
//! ensuring every component agrees on where state lives.

/// Name of the configuration document at the monorepo root.
pub const CONFIG_FILENAME: &str = ".monorepo.json";

/// Name of the cooperative lockfile at the monorepo root.
pub const LOCKFILE_FILENAME: &str = ".monorepo.lock";

/// Name of the directory holding master copies of linked files.
pub const LINKS_DIRNAME: &str = ".monorepo-links";

/// Name of the ignore list written at the monorepo root.
pub const GITIGNORE_FILENAME: &str = ".gitignore";

/// Version-control marker that identifies a Git working tree.
pub const GIT_MARKER: &str = ".git";

/// Remote that `mgit push` and `mgit pull` talk to.
pub const DEFAULT_REMOTE: &str = "origin";

/// Commit message used for the meta repository's first commit.
pub const META_INIT_COMMIT_MESSAGE: &str = "Initialize virtual monorepo";

/// Separator between module name and path in a master copy identifier.
pub const MASTER_COPY_SEPARATOR: &str = "__";

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Schema version assumed for documents that predate the `version` field.
pub const LEGACY_SCHEMA_VERSION: u32 = 1;
