//! # Link Engine
//!
//! Deduplicates a file (or every file under a directory) that lives in one
//! module into another module. Each distinct source gets a master copy in
//! the links directory and every location that shares it, the original
//! source included, becomes a hardlink to that master copy. Writes made
//! in place through any of the names are therefore visible through all of
//! them.
//!
//! A file location belongs to at most one link record. Linking to a
//! location already owned by a different record is rejected with
//! `LinkConflict`; linking from a location that is already a target of a
//! record extends that record.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::config::{LinkEndpoint, LinkRecord, Monorepo};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::lock;
use crate::path;

/// What linking one file did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link record and master copy were created.
    Created,
    /// The target was added to an existing link record.
    Extended,
    /// The target was already part of the record; nothing changed.
    AlreadyLinked,
}

/// One file handled by a link operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedFile {
    pub source: LinkEndpoint,
    pub target: LinkEndpoint,
    pub outcome: LinkOutcome,
}

/// Result of a `link` call
#[derive(Debug, Default)]
pub struct LinkReport {
    /// Files that were linked or found already linked, in enumeration order.
    pub files: Vec<LinkedFile>,
    /// Files that could not be linked, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// The source was a directory with no files beneath it.
    pub empty_directory: bool,
}

impl LinkReport {
    pub fn count(&self, outcome: LinkOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }

    /// Whether the configuration was modified.
    pub fn changed(&self) -> bool {
        self.files
            .iter()
            .any(|f| f.outcome != LinkOutcome::AlreadyLinked)
    }
}

/// Link `source` into `target`, recursing when `source` is a directory.
///
/// Both paths are resolved against the working directory. The lock is held
/// from the first mutation until the configuration has been saved.
pub fn link(repo: &mut Monorepo, source: &Path, target: &Path) -> Result<LinkReport> {
    let source = path::resolve(source)?;
    let target = path::resolve(target)?;

    if !filesystem::entry_exists(&source) {
        return Err(Error::SourceNotFound { path: source });
    }

    let source_module = containing_module(repo, &source)?;
    let target_module = containing_module(repo, &target)?;
    if source_module == target_module {
        return Err(Error::SameModule {
            module: source_module,
        });
    }

    let guard = lock::acquire(repo.root())?;
    let mut report = LinkReport::default();

    if source.is_dir() {
        let files = filesystem::list_files(&source)?;
        if files.is_empty() {
            info!("{} contains no files, nothing to link", source.display());
            report.empty_directory = true;
        }

        for relative in &files {
            let file_source = source.join(relative);
            match link_file(repo, &file_source, &target.join(relative)) {
                Ok(linked) => report.files.push(linked),
                Err(e) if e.is_structural() => return Err(e),
                Err(e) => {
                    error!("failed to link {}: {}", file_source.display(), e);
                    report.failed.push((file_source, e.to_string()));
                }
            }
        }

        if !files.is_empty() && report.files.is_empty() {
            return Err(Error::NothingProcessed {
                message: format!(
                    "none of the {} files under {} could be linked",
                    files.len(),
                    source.display()
                ),
            });
        }
    } else {
        report.files.push(link_file(repo, &source, &target)?);
    }

    if report.changed() {
        repo.save()?;
    }
    guard.release()?;

    Ok(report)
}

fn containing_module(repo: &Monorepo, location: &Path) -> Result<String> {
    repo.config
        .find_module_containing(location)
        .map(|m| m.name.clone())
        .ok_or_else(|| Error::PathNotInModule {
            path: location.to_path_buf(),
        })
}

/// Express an absolute path as a module plus a path inside it.
pub fn endpoint_for(repo: &Monorepo, location: &Path) -> Result<LinkEndpoint> {
    let module = repo
        .config
        .find_module_containing(location)
        .ok_or_else(|| Error::PathNotInModule {
            path: location.to_path_buf(),
        })?;
    let relative = path::relative_path(&module.absolute_path, location);
    Ok(LinkEndpoint::new(
        module.name.clone(),
        path::to_portable(&relative),
    ))
}

fn link_file(repo: &mut Monorepo, source: &Path, target: &Path) -> Result<LinkedFile> {
    let source_ep = endpoint_for(repo, source)?;
    let target_ep = endpoint_for(repo, target)?;
    if source_ep.module == target_ep.module {
        return Err(Error::SameModule {
            module: source_ep.module,
        });
    }

    if let Some(index) = repo.config.link_index_for(&target_ep) {
        let owner = &repo.config.links[index];
        if owner.involves(&source_ep) {
            debug!("{} is already linked to {}", target_ep, source_ep);
            return Ok(LinkedFile {
                source: source_ep,
                target: target_ep,
                outcome: LinkOutcome::AlreadyLinked,
            });
        }
        return Err(Error::LinkConflict {
            module: target_ep.module,
            path: target_ep.path,
            owner: owner.source.to_string(),
        });
    }

    let outcome = match repo.config.link_index_for(&source_ep) {
        Some(index) => {
            extend_record(repo, index, target, target_ep.clone())?;
            LinkOutcome::Extended
        }
        None => {
            create_record(repo, source, &source_ep, target, target_ep.clone())?;
            LinkOutcome::Created
        }
    };

    Ok(LinkedFile {
        source: source_ep,
        target: target_ep,
        outcome,
    })
}

fn extend_record(
    repo: &mut Monorepo,
    index: usize,
    target: &Path,
    target_ep: LinkEndpoint,
) -> Result<()> {
    let master_name = repo.config.links[index].master_copy.clone();
    let master = repo.master_copy_path(&master_name);
    if !master.is_file() {
        return Err(Error::MasterCopyMissing { name: master_name });
    }

    filesystem::ensure_parent(target)?;
    filesystem::hard_link_replacing(&master, target)?;
    info!("linked {} to master copy {}", target_ep, master_name);

    repo.config.links[index].targets.push(target_ep);
    Ok(())
}

fn create_record(
    repo: &mut Monorepo,
    source: &Path,
    source_ep: &LinkEndpoint,
    target: &Path,
    target_ep: LinkEndpoint,
) -> Result<()> {
    let master_name = path::master_copy_name(&source_ep.module, &source_ep.path);
    if let Some(owner) = repo
        .config
        .links
        .iter()
        .find(|record| record.master_copy == master_name)
    {
        return Err(Error::LinkConflict {
            module: source_ep.module.clone(),
            path: source_ep.path.clone(),
            owner: owner.source.to_string(),
        });
    }

    filesystem::ensure_parent(target)?;
    filesystem::ensure_dir(&repo.links_dir())?;
    let master = repo.master_copy_path(&master_name);

    // Left over from an interrupted run; only reuse it if the source
    // already shares its storage.
    if filesystem::entry_exists(&master) && !filesystem::same_file(source, &master)? {
        debug!("removing stale master copy {}", master.display());
        std::fs::remove_file(&master)?;
    }
    let created = !filesystem::entry_exists(&master);
    if created {
        filesystem::copy_file(source, &master)?;
    }

    // A failure must leave the source untouched
    let linked = filesystem::hard_link_replacing(&master, target)
        .and_then(|_| filesystem::hard_link_replacing(&master, source));
    if let Err(e) = linked {
        if created {
            if let Err(cleanup) = std::fs::remove_file(&master) {
                warn!(
                    "could not remove master copy {}: {}",
                    master.display(),
                    cleanup
                );
            }
        }
        return Err(e);
    }
    info!("linked {} -> {} via {}", source_ep, target_ep, master_name);

    repo.config.links.push(LinkRecord {
        source: source_ep.clone(),
        targets: vec![target_ep],
        master_copy: master_name,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Module, MonorepoConfig};
    use crate::defaults::LINKS_DIRNAME;
    use crate::filesystem::same_file;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        root: PathBuf,
        repo: Monorepo,
    }

    impl Fixture {
        fn new(modules: &[&str]) -> Self {
            let temp = TempDir::new().unwrap();
            let root = path::normalize(temp.path());
            let mut config = MonorepoConfig::new("test", None);
            for name in modules {
                fs::create_dir_all(root.join(name)).unwrap();
                config.modules.push(Module {
                    name: name.to_string(),
                    relative_path: name.to_string(),
                    description: None,
                    absolute_path: PathBuf::new(),
                    current_branch: None,
                });
            }
            let repo = Monorepo::new(root.clone(), config);
            fs::write(repo.config_path(), repo.config.to_json().unwrap()).unwrap();
            Self {
                _temp: temp,
                root,
                repo,
            }
        }

        fn file(&self, rel: &str, content: &str) -> PathBuf {
            let p = self.root.join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, content).unwrap();
            p
        }

        fn reload(&self) -> Monorepo {
            Monorepo::load_from(&self.root).unwrap()
        }
    }

    #[test]
    fn test_link_single_file_shares_storage() {
        let mut fx = Fixture::new(&["api", "web"]);
        let source = fx.file("api/config/shared.json", "{}");
        let target = fx.root.join("web/src/shared.json");

        let report = link(&mut fx.repo, &source, &target).unwrap();
        assert_eq!(report.count(LinkOutcome::Created), 1);

        let master = fx.root.join(LINKS_DIRNAME).join("api__config_shared.json");
        assert!(same_file(&master, &source).unwrap());
        assert!(same_file(&master, &target).unwrap());

        let mut handle = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&target)
            .unwrap();
        handle.write_all(b"{\"edited\": true}").unwrap();
        drop(handle);
        assert_eq!(fs::read_to_string(&source).unwrap(), "{\"edited\": true}");
        assert_eq!(fs::read_to_string(&master).unwrap(), "{\"edited\": true}");

        let saved = fx.reload();
        assert_eq!(saved.config.links.len(), 1);
        let record = &saved.config.links[0];
        assert_eq!(record.source, LinkEndpoint::new("api", "config/shared.json"));
        assert_eq!(record.targets, vec![LinkEndpoint::new("web", "src/shared.json")]);
        assert_eq!(record.master_copy, "api__config_shared.json");
        assert!(!lock::read(&fx.root).locked);
    }

    #[test]
    fn test_link_twice_is_idempotent() {
        let mut fx = Fixture::new(&["api", "web"]);
        let source = fx.file("api/a.txt", "a");
        let target = fx.root.join("web/a.txt");

        link(&mut fx.repo, &source, &target).unwrap();
        let config_before = fs::read_to_string(fx.repo.config_path()).unwrap();

        let report = link(&mut fx.repo, &source, &target).unwrap();
        assert_eq!(report.count(LinkOutcome::AlreadyLinked), 1);
        assert!(!report.changed());

        let saved = fx.reload();
        assert_eq!(saved.config.links.len(), 1);
        assert_eq!(saved.config.links[0].targets.len(), 1);
        assert_eq!(
            fs::read_to_string(fx.repo.config_path()).unwrap(),
            config_before
        );
    }

    #[test]
    fn test_link_extends_existing_record() {
        let mut fx = Fixture::new(&["api", "web", "cli"]);
        let source = fx.file("api/a.txt", "a");

        link(&mut fx.repo, &source, &fx.root.join("web/a.txt")).unwrap();
        let report = link(&mut fx.repo, &source, &fx.root.join("cli/a.txt")).unwrap();
        assert_eq!(report.count(LinkOutcome::Extended), 1);

        let saved = fx.reload();
        assert_eq!(saved.config.links.len(), 1);
        assert_eq!(saved.config.links[0].targets.len(), 2);
        assert!(same_file(&source, &fx.root.join("cli/a.txt")).unwrap());
    }

    #[test]
    fn test_link_from_existing_target_extends_its_record() {
        let mut fx = Fixture::new(&["api", "web", "cli"]);
        let source = fx.file("api/a.txt", "a");
        let web = fx.root.join("web/a.txt");
        link(&mut fx.repo, &source, &web).unwrap();

        let report = link(&mut fx.repo, &web, &fx.root.join("cli/a.txt")).unwrap();
        assert_eq!(report.count(LinkOutcome::Extended), 1);

        let saved = fx.reload();
        assert_eq!(saved.config.links.len(), 1);
        assert_eq!(
            saved.config.links[0].targets,
            vec![LinkEndpoint::new("web", "a.txt"), LinkEndpoint::new("cli", "a.txt")]
        );
    }

    #[test]
    fn test_link_target_owned_by_other_record_conflicts() {
        let mut fx = Fixture::new(&["api", "web", "cli"]);
        let a = fx.file("api/a.txt", "a");
        let c = fx.file("cli/c.txt", "c");
        let target = fx.root.join("web/shared.txt");
        link(&mut fx.repo, &a, &target).unwrap();

        let result = link(&mut fx.repo, &c, &target);
        assert!(matches!(result, Err(Error::LinkConflict { owner, .. }) if owner == "api/a.txt"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "a");
        assert!(!lock::read(&fx.root).locked);
    }

    #[test]
    fn test_link_same_module_rejected() {
        let mut fx = Fixture::new(&["api", "web"]);
        let source = fx.file("api/a.txt", "a");

        let result = link(&mut fx.repo, &source, &fx.root.join("api/b.txt"));
        assert!(matches!(result, Err(Error::SameModule { module }) if module == "api"));
        assert!(fx.reload().config.links.is_empty());
        assert!(!fx.root.join("api/b.txt").exists());
    }

    #[test]
    fn test_link_path_outside_modules() {
        let mut fx = Fixture::new(&["api", "web"]);
        let source = fx.file("api/a.txt", "a");

        let result = link(&mut fx.repo, &source, &fx.root.join("elsewhere/a.txt"));
        assert!(matches!(result, Err(Error::PathNotInModule { .. })));
    }

    #[test]
    fn test_link_missing_source() {
        let mut fx = Fixture::new(&["api", "web"]);
        let result = link(
            &mut fx.repo,
            &fx.root.join("api/missing.txt"),
            &fx.root.join("web/missing.txt"),
        );
        assert!(matches!(result, Err(Error::SourceNotFound { .. })));
    }

    #[test]
    fn test_link_directory_creates_parallel_records() {
        let mut fx = Fixture::new(&["api", "web"]);
        fx.file("api/shared/one.txt", "1");
        fx.file("api/shared/nested/two.txt", "2");

        let report = link(
            &mut fx.repo,
            &fx.root.join("api/shared"),
            &fx.root.join("web/vendor"),
        )
        .unwrap();
        assert_eq!(report.count(LinkOutcome::Created), 2);
        assert!(report.failed.is_empty());

        let saved = fx.reload();
        let pairs: Vec<(String, String)> = saved
            .config
            .links
            .iter()
            .map(|r| (r.source.path.clone(), r.targets[0].path.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("shared/nested/two.txt".to_string(), "vendor/nested/two.txt".to_string()),
                ("shared/one.txt".to_string(), "vendor/one.txt".to_string()),
            ]
        );
        assert_eq!(
            fs::read_to_string(fx.root.join("web/vendor/nested/two.txt")).unwrap(),
            "2"
        );
    }

    #[test]
    fn test_link_empty_directory_is_reported_not_error() {
        let mut fx = Fixture::new(&["api", "web"]);
        fs::create_dir_all(fx.root.join("api/empty/inner")).unwrap();

        let report = link(
            &mut fx.repo,
            &fx.root.join("api/empty"),
            &fx.root.join("web/empty"),
        )
        .unwrap();
        assert!(report.empty_directory);
        assert!(report.files.is_empty());
        assert!(fx.reload().config.links.is_empty());
    }

    #[test]
    fn test_link_replaces_existing_target_file() {
        let mut fx = Fixture::new(&["api", "web"]);
        let source = fx.file("api/a.txt", "fresh");
        let target = fx.file("web/a.txt", "stale");

        link(&mut fx.repo, &source, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "fresh");
        assert!(same_file(&source, &target).unwrap());
    }

    #[test]
    fn test_link_while_locked() {
        let mut fx = Fixture::new(&["api", "web"]);
        let source = fx.file("api/a.txt", "a");
        let _guard = lock::acquire(&fx.root).unwrap();

        let result = link(&mut fx.repo, &source, &fx.root.join("web/a.txt"));
        assert!(matches!(result, Err(Error::LockHeld { .. })));
        assert!(!fx.root.join("web/a.txt").exists());
    }

    #[test]
    fn test_extend_with_missing_master_copy() {
        let mut fx = Fixture::new(&["api", "web", "cli"]);
        let source = fx.file("api/a.txt", "a");
        link(&mut fx.repo, &source, &fx.root.join("web/a.txt")).unwrap();
        fs::remove_file(fx.root.join(LINKS_DIRNAME).join("api__a.txt")).unwrap();

        let result = link(&mut fx.repo, &source, &fx.root.join("cli/a.txt"));
        assert!(matches!(result, Err(Error::MasterCopyMissing { .. })));
        assert_eq!(fx.reload().config.links[0].targets.len(), 1);
    }

    #[test]
    fn test_directory_link_tallies_per_file_failures() {
        let mut fx = Fixture::new(&["api", "web"]);
        fx.file("api/dir/ok.txt", "ok");
        fx.file("api/dir/blocked.txt", "blocked");
        // A directory in the way of one target makes that single file fail
        fs::create_dir_all(fx.root.join("web/dir/blocked.txt")).unwrap();

        let report = link(
            &mut fx.repo,
            &fx.root.join("api/dir"),
            &fx.root.join("web/dir"),
        )
        .unwrap();
        assert_eq!(report.count(LinkOutcome::Created), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(fx.reload().config.links.len(), 1);
        // The failed file leaves no master copy behind
        let links_dir = fx.root.join(LINKS_DIRNAME);
        assert!(!links_dir.join("api__dir_blocked.txt").exists());
        assert!(links_dir.join("api__dir_ok.txt").is_file());
    }

    #[test]
    fn test_failed_directory_link_leaves_no_master_copies() {
        let mut fx = Fixture::new(&["api", "web"]);
        fx.file("api/dir/one.txt", "1");
        fx.file("api/dir/two.txt", "2");
        let blocker = fx.file("web/dir", "not a directory");

        let result = link(
            &mut fx.repo,
            &fx.root.join("api/dir"),
            &fx.root.join("web/dir"),
        );
        assert!(matches!(result, Err(Error::NothingProcessed { .. })));

        let links_dir = fx.root.join(LINKS_DIRNAME);
        let leftovers = match fs::read_dir(&links_dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        };
        assert_eq!(leftovers, 0);
        assert!(fx.reload().config.links.is_empty());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
        assert_eq!(
            fs::read_to_string(fx.root.join("api/dir/one.txt")).unwrap(),
            "1"
        );
    }

    #[test]
    fn test_endpoint_for_nested_path() {
        let fx = Fixture::new(&["api"]);
        let endpoint = endpoint_for(&fx.repo, &fx.root.join("api/src/lib/mod.rs")).unwrap();
        assert_eq!(endpoint, LinkEndpoint::new("api", "src/lib/mod.rs"));
    }
}
