//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use virtual_monorepo::output;

use crate::commands;

/// mono - Manage independent Git repositories as one virtual monorepo
#[derive(Parser, Debug)]
#[command(name = "mono")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        env = "MONO_LOG_LEVEL",
        default_value = "warn"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new virtual monorepo
    Init(commands::init::InitArgs),

    /// Register a directory as a module
    Add(commands::add::AddArgs),

    /// Unregister a module
    Remove(commands::remove::RemoveArgs),

    /// List registered modules
    List(commands::list::ListArgs),

    /// Share a file or directory from one module with another
    Link(commands::link::LinkArgs),

    /// Verify links and repair what can be repaired
    Check(commands::check::CheckArgs),

    /// Clear a lock left behind by an interrupted command
    Unlock(commands::unlock::UnlockArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        output::init_logger(&self.log_level);
        let color = self.color.as_str();

        match self.command {
            Commands::Init(args) => commands::init::execute(args, color),
            Commands::Add(args) => commands::add::execute(args, color),
            Commands::Remove(args) => commands::remove::execute(args, color),
            Commands::List(args) => commands::list::execute(args),
            Commands::Link(args) => commands::link::execute(args, color),
            Commands::Check(args) => commands::check::execute(args, color),
            Commands::Unlock(args) => commands::unlock::execute(args, color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
