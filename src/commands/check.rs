//! # Check Command Implementation
//!
//! Runs the link audit: verifies every module directory and link record,
//! repairs missing or broken hardlinks, and prints what it found.

use anyhow::Result;
use clap::Args;

use virtual_monorepo::audit::{self, FindingKind};
use virtual_monorepo::config::Monorepo;
use virtual_monorepo::output::{emoji, OutputConfig};

/// Verify links and repair what can be repaired
#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Execute the `check` command.
///
/// Problems that could not be fixed are reported but do not change the
/// exit status.
pub fn execute(_args: CheckArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let mut repo = Monorepo::load()?;

    println!(
        "{} {}",
        emoji(&out, "🔍", "[SCAN]"),
        out.heading(&format!("Checking monorepo '{}'...", repo.config.name))
    );

    let report = audit::check(&mut repo)?;

    for finding in &report.findings {
        match finding.kind {
            FindingKind::Fixed => println!(
                "{} {}",
                emoji(&out, "🔧", "[FIXED]"),
                out.success(&finding.message)
            ),
            FindingKind::Error => println!(
                "{} {}",
                emoji(&out, "❌", "[ERR]"),
                out.failure(&finding.message)
            ),
        }
    }

    let summary = format!(
        "Checked {} items: {} errors found, {} issues fixed.",
        report.checked, report.errors, report.fixed
    );
    if report.errors == 0 {
        println!("\n{} {}", emoji(&out, "✅", "[OK]"), out.success(&summary));
    } else {
        println!("\n{} {}", emoji(&out, "⚠️", "[WARN]"), out.warning(&summary));
    }
    Ok(())
}
