//! # List Command Implementation
//!
//! Read-only listing of the registered modules. Does not take the lock.

use anyhow::Result;
use clap::Args;

use virtual_monorepo::config::Monorepo;
use virtual_monorepo::registry;

/// List registered modules
#[derive(Args, Debug)]
pub struct ListArgs {}

/// Execute the `list` command.
pub fn execute(_args: ListArgs) -> Result<()> {
    let repo = Monorepo::load()?;
    print!("{}", registry::describe_modules(&repo));
    if repo.config.modules.is_empty() {
        println!();
    }
    Ok(())
}
