//! End-to-end tests for the `mgit` fan-out binary.
//!
//! Tests that need working Git repositories are gated behind the
//! `integration-tests` feature. The rest only use directories without a
//! `.git` marker, or with a broken one, so every Git call fails fast.

mod common;
use common::prelude::*;
use std::process::Command as StdCommand;

fn three_plain_modules() -> TestFixture {
    TestFixture::new()
        .with_monorepo("platform")
        .with_module("api")
        .with_module("web")
        .with_module("docs")
}

#[test]
fn test_status_skips_non_git_modules() {
    let fixture = three_plain_modules();

    fixture
        .mgit()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running git status in api..."))
        .stdout(predicate::str::contains("skipped: not a Git repository"))
        .stdout(predicate::str::contains(
            "Completed git status: 0 succeeded, 4 skipped, 0 without changes, 0 failed.",
        ));
}

#[test]
fn test_failing_module_does_not_stop_the_others() {
    let fixture = three_plain_modules().with_broken_git("web");

    let assert = fixture.mgit().arg("status").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();

    assert!(stdout.contains("Running git status in docs..."));
    assert!(stdout.contains("failed:"));
    assert!(stdout.contains("0 succeeded, 3 skipped, 0 without changes, 1 failed."));
}

#[test]
fn test_parallel_jobs_keep_module_order() {
    let fixture = three_plain_modules().with_module("infra");

    let assert = fixture
        .mgit()
        .args(["--jobs", "4", "status"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();

    let positions: Vec<usize> = ["api", "web", "docs", "infra"]
        .iter()
        .map(|name| {
            stdout
                .find(&format!("Running git status in {}...", name))
                .unwrap_or_else(|| panic!("no section for {}", name))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_jobs_from_environment() {
    let fixture = three_plain_modules();

    fixture
        .mgit()
        .env("MGIT_JOBS", "2")
        .arg("status")
        .assert()
        .success();
}

#[test]
fn test_push_skips_meta_repository() {
    let fixture = three_plain_modules();

    fixture
        .mgit()
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "skipped: the meta repository stays local",
        ));
}

#[test]
fn test_commit_requires_message_without_terminal() {
    let fixture = three_plain_modules();

    fixture
        .mgit()
        .arg("commit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("commit message is required"));
}

#[test]
fn test_commit_rejects_empty_message() {
    let fixture = three_plain_modules();

    fixture
        .mgit()
        .args(["commit", "-m", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}

#[test]
fn test_switch_is_alias_for_checkout() {
    let fixture = three_plain_modules();

    fixture
        .mgit()
        .args(["switch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Running git checkout across 'platform'"));
}

#[test]
fn test_mgit_outside_monorepo_fails() {
    let temp = assert_fs::TempDir::new().unwrap();

    cargo_bin_cmd!("mgit")
        .current_dir(temp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Monorepo not initialized"));
}

fn git(dir: &std::path::Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_checkout_creates_branch_everywhere() {
    let fixture = TestFixture::new()
        .with_monorepo("platform")
        .with_module("api")
        .with_module("web");
    for dir in [".", "api", "web"] {
        git(&fixture.path().join(dir), &["init", "-q"]);
    }

    fixture
        .mgit()
        .args(["checkout", "-b", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Completed git checkout: 3 succeeded, 0 skipped, 0 without changes, 0 failed.",
        ));

    fixture
        .mgit()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Branch: feature"))
        .stdout(predicate::str::contains(format!(
            "Path: {}",
            fixture.path().join("api").display()
        )));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_commit_reports_modules_without_changes() {
    let fixture = TestFixture::new()
        .with_monorepo("platform")
        .with_module("api")
        .with_module("web");
    for dir in ["api", "web"] {
        let path = fixture.path().join(dir);
        git(&path, &["init", "-q"]);
        git(&path, &["config", "user.email", "dev@example.com"]);
        git(&path, &["config", "user.name", "Dev"]);
    }
    std::fs::write(fixture.path().join("api/main.rs"), "fn main() {}").unwrap();

    fixture.mgit().arg("add").assert().success();
    fixture
        .mgit()
        .args(["commit", "-m", "Add entry point"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 succeeded, 1 skipped, 1 without changes, 0 failed.",
        ));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_push_skips_modules_without_origin() {
    let fixture = TestFixture::new()
        .with_monorepo("platform")
        .with_module("api");
    git(&fixture.path().join("api"), &["init", "-q"]);

    fixture
        .mgit()
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains("no 'origin' remote configured"));
}
