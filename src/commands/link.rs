//! # Link Command Implementation
//!
//! Shares a file, or every file under a directory, from one module with
//! another. Both locations end up hardlinked to one master copy in
//! `.monorepo-links/`.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use virtual_monorepo::config::Monorepo;
use virtual_monorepo::links::{self, LinkOutcome};
use virtual_monorepo::output::{emoji, OutputConfig};

/// Share a file or directory from one module with another
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// File or directory to share
    #[arg(short, long, value_name = "PATH")]
    pub source: PathBuf,

    /// Location in another module that should receive it
    #[arg(short, long, value_name = "PATH")]
    pub target: PathBuf,
}

/// Execute the `link` command.
pub fn execute(args: LinkArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let mut repo = Monorepo::load()?;

    let report = links::link(&mut repo, &args.source, &args.target)?;

    if report.empty_directory {
        println!(
            "{} {}",
            emoji(&out, "ℹ️", "[INFO]"),
            out.warning(&format!(
                "{} contains no files, nothing was linked",
                args.source.display()
            ))
        );
        return Ok(());
    }

    for file in &report.files {
        match file.outcome {
            LinkOutcome::Created | LinkOutcome::Extended => println!(
                "{} Linked {} -> {}",
                emoji(&out, "🔗", "[LINK]"),
                file.source,
                file.target
            ),
            LinkOutcome::AlreadyLinked => println!(
                "{} {} is already linked to {}",
                emoji(&out, "✓", "[SAME]"),
                file.target,
                file.source
            ),
        }
    }
    for (path, reason) in &report.failed {
        println!(
            "{} {}",
            emoji(&out, "❌", "[ERR]"),
            out.failure(&format!("Failed to link {}: {}", path.display(), reason))
        );
    }

    let linked = report.count(LinkOutcome::Created) + report.count(LinkOutcome::Extended);
    let summary = format!(
        "Completed with {} linked, {} already linked, and {} errors.",
        linked,
        report.count(LinkOutcome::AlreadyLinked),
        report.failed.len()
    );
    if report.failed.is_empty() {
        println!("\n{}", out.success(&summary));
    } else {
        println!("\n{}", out.warning(&summary));
    }
    Ok(())
}
