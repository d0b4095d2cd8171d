//! # Audit Engine
//!
//! `mono check` walks the whole configuration and repairs what it can:
//! a missing links directory, missing master copies (regenerated from the
//! link source) and locations whose hardlink to the master copy is missing
//! or broken. Modules whose directory vanished are reported but never
//! removed automatically.
//!
//! Link endpoints in modules that are no longer registered are dropped
//! from their record, and a record with no valid endpoint left is dropped
//! entirely. The configuration is saved only when the link list changed.
//!
//! Relinking a location whose hardlink was broken replaces its content with
//! the master copy. Edits made to the broken copy are lost.

use std::path::Path;

use log::{error, info, warn};

use crate::config::{LinkEndpoint, LinkRecord, Monorepo};
use crate::error::Result;
use crate::filesystem;
use crate::lock;

/// Severity of one audit finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    /// A problem that was repaired.
    Fixed,
    /// A problem that needs manual attention.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
}

/// Totals of an audit run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Modules and link records examined.
    pub checked: usize,
    pub errors: usize,
    pub fixed: usize,
    /// Every finding in the order it was made.
    pub findings: Vec<Finding>,
}

impl AuditReport {
    fn fix(&mut self, message: String) {
        info!("fixed: {}", message);
        self.fixed += 1;
        self.findings.push(Finding {
            kind: FindingKind::Fixed,
            message,
        });
    }

    fn error(&mut self, message: String) {
        warn!("{}", message);
        self.errors += 1;
        self.findings.push(Finding {
            kind: FindingKind::Error,
            message,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Check and repair every module and link record.
pub fn check(repo: &mut Monorepo) -> Result<AuditReport> {
    let guard = lock::acquire(repo.root())?;
    let mut report = AuditReport::default();

    let links_dir = repo.links_dir();
    if !links_dir.is_dir() {
        filesystem::ensure_dir(&links_dir)?;
        report.fix(format!("created links directory {}", links_dir.display()));
    }

    for module in &repo.config.modules {
        report.checked += 1;
        if !module.absolute_path.exists() {
            report.error(format!(
                "module '{}' path does not exist: {}",
                module.name,
                module.absolute_path.display()
            ));
        }
    }

    let original = repo.config.links.clone();
    let mut repaired = Vec::with_capacity(original.len());
    for record in &original {
        report.checked += 1;
        if let Some(kept) = audit_record(repo, record, &mut report) {
            repaired.push(kept);
        } else {
            warn!(
                "dropping link record for {} ({}): no valid endpoint left",
                record.source, record.master_copy
            );
        }
    }

    if repaired != original {
        repo.config.links = repaired;
        repo.save()?;
    }
    guard.release()?;

    info!(
        "audit finished: {} checked, {} errors, {} fixed",
        report.checked, report.errors, report.fixed
    );
    Ok(report)
}

/// Audit one record, returning the repaired record if it is worth keeping.
fn audit_record(
    repo: &Monorepo,
    record: &LinkRecord,
    report: &mut AuditReport,
) -> Option<LinkRecord> {
    let master = repo.master_copy_path(&record.master_copy);
    let mut any_valid = false;

    match repo.endpoint_path(&record.source) {
        None => report.error(format!(
            "link source module '{}' no longer exists (master copy {})",
            record.source.module, record.master_copy
        )),
        Some(_) if !module_dir_exists(repo, &record.source) => {
            report_missing_module(repo, &record.source, report)
        }
        Some(source) => {
            if !master.is_file() {
                if source.is_file() {
                    match filesystem::copy_file(&source, &master) {
                        Ok(()) => report.fix(format!(
                            "regenerated master copy {} from {}",
                            record.master_copy, record.source
                        )),
                        Err(e) => report.error(format!(
                            "could not regenerate master copy {}: {}",
                            record.master_copy, e
                        )),
                    }
                } else {
                    report.error(format!(
                        "master copy {} and its source {} are both missing",
                        record.master_copy, record.source
                    ));
                }
            }
            any_valid |= repair_location(&master, &source, &record.source, report);
        }
    }

    let mut targets = Vec::with_capacity(record.targets.len());
    for target in &record.targets {
        match repo.endpoint_path(target) {
            None => report.error(format!(
                "link target module '{}' no longer exists, dropping {}",
                target.module, target
            )),
            Some(_) if !module_dir_exists(repo, target) => {
                report_missing_module(repo, target, report);
                targets.push(target.clone());
            }
            Some(location) => {
                any_valid |= repair_location(&master, &location, target, report);
                targets.push(target.clone());
            }
        }
    }

    any_valid.then(|| LinkRecord {
        source: record.source.clone(),
        targets,
        master_copy: record.master_copy.clone(),
    })
}

fn module_dir_exists(repo: &Monorepo, endpoint: &LinkEndpoint) -> bool {
    repo.config
        .module(&endpoint.module)
        .is_some_and(|m| m.absolute_path.is_dir())
}

/// Endpoints in a vanished module are left alone so the directory is not
/// recreated as a plain tree.
fn report_missing_module(repo: &Monorepo, endpoint: &LinkEndpoint, report: &mut AuditReport) {
    let dir = repo
        .config
        .module(&endpoint.module)
        .map(|m| m.absolute_path.display().to_string())
        .unwrap_or_default();
    report.error(format!(
        "cannot repair {}: module directory {} is missing",
        endpoint, dir
    ));
}

/// Make sure `location` is a hardlink of `master`.
///
/// Returns whether the location holds a file afterwards.
fn repair_location(
    master: &Path,
    location: &Path,
    endpoint: &LinkEndpoint,
    report: &mut AuditReport,
) -> bool {
    if !master.is_file() {
        // Nothing to link against; keep whatever is on disk
        return location.is_file();
    }

    let existed = location.is_file();
    if existed {
        match filesystem::same_file(master, location) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => {
                report.error(format!("could not inspect {}: {}", endpoint, e));
                return true;
            }
        }
    }

    let result = filesystem::ensure_parent(location)
        .and_then(|_| filesystem::hard_link_replacing(master, location));
    match result {
        Ok(()) => {
            if existed {
                report.fix(format!("relinked {} to its master copy", endpoint));
            } else {
                report.fix(format!("recreated {} from its master copy", endpoint));
            }
            true
        }
        Err(e) => {
            error!("failed to repair {}: {}", endpoint, e);
            report.error(format!("could not repair {}: {}", endpoint, e));
            existed
        }
    }
}
