//! # mono
//!
//! Binary entry point for the `mono` command-line tool, which manages the
//! modules and shared files of a virtual monorepo.
//!
//! The binary only parses arguments and prints results; all behaviour lives
//! in the `virtual_monorepo` library so it can be reused and tested on its
//! own. Git fan-out across modules is the separate `mgit` binary.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
