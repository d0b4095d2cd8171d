//! # Remove Command Implementation

use anyhow::Result;
use clap::Args;

use virtual_monorepo::config::Monorepo;
use virtual_monorepo::output::{emoji, OutputConfig};
use virtual_monorepo::registry;

/// Unregister a module
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Name of the module to remove
    #[arg(short, long)]
    pub name: String,
}

/// Execute the `remove` command.
///
/// The module's files are left untouched. Link records that still point
/// into the module are reported; `mono check` cleans them up.
pub fn execute(args: RemoveArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let mut repo = Monorepo::load()?;

    let removed = registry::remove_module(&mut repo, &args.name)?;
    println!(
        "{} {}",
        emoji(&out, "✅", "[OK]"),
        out.success(&format!("Removed module '{}'", removed.module.name))
    );

    if removed.dangling_links > 0 {
        println!(
            "{} {}",
            emoji(&out, "⚠️", "[WARN]"),
            out.warning(&format!(
                "{} link record(s) still reference '{}'. Run `mono check` to clean them up.",
                removed.dangling_links, removed.module.name
            ))
        );
    }
    Ok(())
}
