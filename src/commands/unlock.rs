//! # Unlock Command Implementation
//!
//! The lockfile has no expiry, so a `mono` process that was killed while
//! holding it leaves the monorepo locked. This command clears it.

use anyhow::Result;
use clap::Args;

use virtual_monorepo::config::Monorepo;
use virtual_monorepo::lock;
use virtual_monorepo::output::{emoji, OutputConfig};

/// Clear a lock left behind by an interrupted command
#[derive(Args, Debug)]
pub struct UnlockArgs {}

/// Execute the `unlock` command.
pub fn execute(_args: UnlockArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let repo = Monorepo::load()?;

    match lock::force_unlock(repo.root())? {
        Some(previous) => println!(
            "{} {}",
            emoji(&out, "🔓", "[UNLOCKED]"),
            out.success(&format!(
                "Cleared lock held by pid {} since {}",
                previous
                    .pid
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                previous.timestamp.as_deref().unwrap_or("unknown")
            ))
        ),
        None => println!("Monorepo is not locked"),
    }
    Ok(())
}
