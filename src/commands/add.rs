//! # Add Command Implementation
//!
//! Registers an existing directory as a module of the monorepo containing
//! the working directory.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use virtual_monorepo::config::Monorepo;
use virtual_monorepo::output::{emoji, OutputConfig};
use virtual_monorepo::registry;

/// Register a directory as a module
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Path of the module directory
    #[arg(short, long, value_name = "DIR")]
    pub path: PathBuf,

    /// Module name (defaults to the directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Optional description
    #[arg(short, long)]
    pub description: Option<String>,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let mut repo = Monorepo::load()?;

    let module = registry::add_module(
        &mut repo,
        &args.path,
        args.name.as_deref(),
        args.description.as_deref(),
    )?;

    println!(
        "{} {}",
        emoji(&out, "✅", "[OK]"),
        out.success(&format!(
            "Added module '{}' at {}",
            module.name,
            module.absolute_path.display()
        ))
    );
    Ok(())
}
