//! Shared test utilities for the CLI end-to-end tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_monorepo("platform").with_module("api");
//!     fixture.mono().arg("list").assert().success();
//! }
//! ```
//!
//! Fixtures write `.monorepo.json` and the lockfile directly instead of
//! running `mono init`, so tests that do not care about the meta repository
//! never spawn `git`.

use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    #[cfg(unix)]
    pub use super::same_inode;
    pub use super::TestFixture;
}

/// A temporary directory that can be populated with a monorepo layout.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    root: PathBuf,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        // Canonical so paths printed by the binaries match on macOS too
        let root = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");
        Self { temp_dir, root }
    }

    /// Write an empty monorepo called `name` at the fixture root.
    pub fn with_monorepo(self, name: &str) -> Self {
        self.with_config(&format!(
            r#"{{
  "version": 2,
  "name": "{}",
  "modules": [],
  "links": []
}}
"#,
            name
        ))
    }

    /// Write `.monorepo.json` verbatim, plus an unlocked lockfile and the
    /// links directory.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".monorepo.json")
            .write_str(content)
            .expect("Failed to write config file");
        self.temp_dir
            .child(".monorepo.lock")
            .write_str(r#"{"locked": false}"#)
            .expect("Failed to write lockfile");
        self.temp_dir
            .child(".monorepo-links")
            .create_dir_all()
            .expect("Failed to create links directory");
        self
    }

    /// Create the module directory `name` and register it via `mono add`.
    pub fn with_module(self, name: &str) -> Self {
        self.temp_dir
            .child(name)
            .create_dir_all()
            .expect("Failed to create module directory");
        self.mono()
            .args(["add", "--path", name])
            .assert()
            .success();
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Give the directory `path` a `.git` file pointing at a gitdir that
    /// does not exist, so every `git` call there fails.
    pub fn with_broken_git(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .child(".git")
            .write_str("gitdir: /nonexistent/monorepo-test-gitdir\n")
            .expect("Failed to write .git file");
        self
    }

    /// Mark the monorepo as locked by another process.
    pub fn with_lock_held(self) -> Self {
        self.temp_dir
            .child(".monorepo.lock")
            .write_str(
                r#"{"locked": true, "timestamp": "2024-01-01T00:00:00.000Z", "pid": 4242}"#,
            )
            .expect("Failed to write lockfile");
        self
    }

    /// Canonical path of the fixture root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Get a child path for assertions.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file below the root.
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.root.join(path)).expect("Failed to read file")
    }

    /// Parsed `.monorepo.json`.
    pub fn config(&self) -> serde_json::Value {
        serde_json::from_str(&self.read(".monorepo.json")).expect("Config is not valid JSON")
    }

    /// Parsed `.monorepo.lock`.
    pub fn lock(&self) -> serde_json::Value {
        serde_json::from_str(&self.read(".monorepo.lock")).expect("Lockfile is not valid JSON")
    }

    /// `mono` running in the fixture root with colours off.
    pub fn mono(&self) -> Command {
        self.command(assert_cmd::cargo::cargo_bin_cmd!("mono"))
    }

    /// `mgit` running in the fixture root with colours off.
    pub fn mgit(&self) -> Command {
        self.command(assert_cmd::cargo::cargo_bin_cmd!("mgit"))
    }

    fn command(&self, mut cmd: Command) -> Command {
        cmd.current_dir(&self.root)
            .env("NO_COLOR", "1")
            .env_remove("MONO_LOG_LEVEL")
            .env_remove("MGIT_JOBS")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `a` and `b` are the same file on disk.
#[allow(dead_code)]
#[cfg(unix)]
pub fn same_inode(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    let a = std::fs::metadata(a).expect("Failed to stat");
    let b = std::fs::metadata(b).expect("Failed to stat");
    a.dev() == b.dev() && a.ino() == b.ino()
}
