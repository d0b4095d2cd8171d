//! # Monorepo Configuration Store
//!
//! This module defines the data structures persisted in the `.monorepo.json`
//! document at the monorepo root and the logic for loading and saving them.
//!
//! ## Key Components
//!
//! - **`MonorepoConfig`**: The persisted document: a name, an optional
//!   description, the registered modules and the link records.
//!
//! - **`Module`**: One registered Git working tree. Its path is stored
//!   relative to the root; the absolute path is derived on load and never
//!   written back.
//!
//! - **`LinkRecord`**: One deduplicated file shared between a source location
//!   and any number of target locations, all backed by a master copy.
//!
//! - **`Monorepo`**: A loaded document bound to the root directory it was
//!   found in. All mutating operations take `&mut Monorepo` and persist
//!   through [`Monorepo::save`].
//!
//! ## Schema Evolution
//!
//! Documents carry a `version`. Documents written before versioning existed
//! are read as version 1, a missing `links` list is read as empty, and the
//! document is upgraded to the current version in memory. Versions newer
//! than this build are rejected as corrupt rather than half-understood.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::defaults::{
    CONFIG_FILENAME, CURRENT_SCHEMA_VERSION, LEGACY_SCHEMA_VERSION, LINKS_DIRNAME,
    LOCKFILE_FILENAME,
};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::path;

fn legacy_version() -> u32 {
    LEGACY_SCHEMA_VERSION
}

/// The persisted monorepo configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonorepoConfig {
    /// Schema version of the document.
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Human-readable name of the monorepo.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registered modules, in insertion order.
    #[serde(default)]
    pub modules: Vec<Module>,
    /// Deduplicated file links between modules.
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// A registered module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Unique module name.
    pub name: String,
    /// Path of the module root relative to the monorepo root, `/`-separated.
    #[serde(rename = "path")]
    pub relative_path: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absolute module path, derived from `relative_path` on load.
    #[serde(skip)]
    pub absolute_path: PathBuf,
    /// Branch observed during this process, cached by branch switching.
    #[serde(skip)]
    pub current_branch: Option<String>,
}

/// One location of a linked file: a module and a path inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEndpoint {
    /// Name of the module holding the file.
    pub module: String,
    /// `/`-separated path of the file relative to the module root.
    pub path: String,
}

/// A deduplicated file replicated into one or more module locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Where the file originally lived.
    pub source: LinkEndpoint,
    /// Additional locations sharing the same master copy.
    #[serde(default)]
    pub targets: Vec<LinkEndpoint>,
    /// File name of the master copy inside the links directory.
    #[serde(rename = "masterCopy")]
    pub master_copy: String,
}

impl LinkEndpoint {
    pub fn new(module: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for LinkEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.module, self.path)
    }
}

impl LinkRecord {
    /// Whether `endpoint` is this record's source or one of its targets.
    pub fn involves(&self, endpoint: &LinkEndpoint) -> bool {
        self.source == *endpoint || self.targets.contains(endpoint)
    }

    /// Whether any endpoint of this record lives in `module`.
    pub fn references_module(&self, module: &str) -> bool {
        self.source.module == module || self.targets.iter().any(|t| t.module == module)
    }
}

impl MonorepoConfig {
    /// Create an empty configuration at the current schema version.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            name: name.into(),
            description,
            modules: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Parse a document, filling defaults for fields older versions lacked.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut config: MonorepoConfig =
            serde_json::from_str(content).map_err(|e| Error::CorruptConfig {
                path: origin.to_path_buf(),
                message: e.to_string(),
                hint: None,
            })?;

        if config.version > CURRENT_SCHEMA_VERSION {
            return Err(Error::CorruptConfig {
                path: origin.to_path_buf(),
                message: format!(
                    "unsupported schema version {} (this build understands up to {})",
                    config.version, CURRENT_SCHEMA_VERSION
                ),
                hint: Some("Upgrade mono to a newer release".to_string()),
            });
        }
        if config.version < CURRENT_SCHEMA_VERSION {
            debug!(
                "upgrading config schema from version {} to {}",
                config.version, CURRENT_SCHEMA_VERSION
            );
            config.version = CURRENT_SCHEMA_VERSION;
        }

        Ok(config)
    }

    /// Serialize the document in its persisted form.
    ///
    /// Derived fields are `#[serde(skip)]` and never appear in the output.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Derive every module's absolute path from its stored relative path.
    pub fn resolve_module_paths(&mut self, root: &Path) {
        for module in &mut self.modules {
            module.absolute_path =
                path::resolve_from(root, path::from_portable(&module.relative_path));
        }
    }

    /// Look up a module by name.
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Find the module whose directory contains `path`.
    ///
    /// Containment is component-wise, and when modules are nested the one
    /// with the longest matching path wins.
    pub fn find_module_containing(&self, path: &Path) -> Option<&Module> {
        let path = path::normalize(path);
        self.modules
            .iter()
            .filter(|m| path.starts_with(&m.absolute_path))
            .max_by_key(|m| m.absolute_path.components().count())
    }

    /// Index of the link record that `endpoint` belongs to, if any.
    pub fn link_index_for(&self, endpoint: &LinkEndpoint) -> Option<usize> {
        self.links.iter().position(|record| record.involves(endpoint))
    }
}

/// A configuration document bound to its monorepo root
#[derive(Debug, Clone)]
pub struct Monorepo {
    root: PathBuf,
    /// The loaded document, with derived module paths filled in.
    pub config: MonorepoConfig,
}

impl Monorepo {
    /// Load the monorepo containing the current working directory.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load_from(&cwd)
    }

    /// Load the monorepo containing `start`.
    ///
    /// Fails with `NotInitialized` when no ancestor holds a configuration
    /// document and with `CorruptConfig` when the document cannot be parsed.
    pub fn load_from(start: &Path) -> Result<Self> {
        let root = path::find_root(Some(start))?.ok_or_else(|| Error::NotInitialized {
            start: start.to_path_buf(),
        })?;

        let config_path = root.join(CONFIG_FILENAME);
        let content = fs::read_to_string(&config_path)?;
        let mut config = MonorepoConfig::parse(&content, &config_path)?;
        config.resolve_module_paths(&root);
        debug!(
            "loaded monorepo '{}' from {} ({} modules, {} links)",
            config.name,
            root.display(),
            config.modules.len(),
            config.links.len()
        );

        Ok(Self { root, config })
    }

    /// Bind a configuration to `root` without touching the disk.
    pub fn new(root: PathBuf, mut config: MonorepoConfig) -> Self {
        let root = path::normalize(&root);
        config.resolve_module_paths(&root);
        Self { root, config }
    }

    /// Persist the configuration document.
    ///
    /// The root is re-resolved first so a document that disappeared since
    /// loading is reported as `NotInitialized` rather than silently
    /// recreated.
    pub fn save(&self) -> Result<()> {
        match path::find_root(Some(&self.root))? {
            Some(found) if found == self.root => {}
            _ => {
                return Err(Error::NotInitialized {
                    start: self.root.clone(),
                })
            }
        }

        let json = self.config.to_json()?;
        filesystem::write_atomic(&self.config_path(), json.as_bytes())?;
        info!("saved monorepo config to {}", self.config_path().display());
        Ok(())
    }

    /// The monorepo root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    pub fn links_dir(&self) -> PathBuf {
        self.root.join(LINKS_DIRNAME)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCKFILE_FILENAME)
    }

    /// Path of a master copy inside the links directory.
    pub fn master_copy_path(&self, name: &str) -> PathBuf {
        self.links_dir().join(name)
    }

    /// Absolute path of a link endpoint, if its module is registered.
    pub fn endpoint_path(&self, endpoint: &LinkEndpoint) -> Option<PathBuf> {
        self.config
            .module(&endpoint.module)
            .map(|m| m.absolute_path.join(path::from_portable(&endpoint.path)))
    }
}
