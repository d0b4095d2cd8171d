//! mgit - run one Git command across the meta repository and every module

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Input};

use virtual_monorepo::config::Monorepo;
use virtual_monorepo::consistency;
use virtual_monorepo::orchestrator::{FanOutReport, GitAction, Orchestrator, RepoStatus};
use virtual_monorepo::output::{self, emoji, OutputConfig};
use virtual_monorepo::repository::DefaultGitOperations;

/// mgit - Git across every repository of a virtual monorepo
#[derive(Parser, Debug)]
#[command(name = "mgit")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: GitCommand,

    /// Number of modules to process at once
    #[arg(
        short,
        long,
        global = true,
        value_name = "N",
        env = "MGIT_JOBS",
        default_value_t = 1
    )]
    jobs: usize,

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
enum GitCommand {
    /// Show the working tree status of every repository
    Status,

    /// Stage all changes in every repository
    Add,

    /// Commit staged changes in every repository that has changes
    Commit {
        /// Commit message; prompted for when omitted on a terminal
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Push every module that has an origin remote
    Push,

    /// Pull every module that has an origin remote
    Pull,

    /// Check out a branch everywhere
    #[command(visible_alias = "switch")]
    Checkout {
        /// Branch to check out
        branch: String,

        /// Create the branch instead of switching to an existing one
        #[arg(short = 'b', long = "create")]
        create: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    output::init_logger(&cli.log_level);
    let out = OutputConfig::from_env_and_flag(&cli.color);

    let (action, validate) = match cli.command {
        GitCommand::Status => (GitAction::Status, false),
        GitCommand::Add => (GitAction::Add, true),
        GitCommand::Commit { message } => (
            GitAction::Commit {
                message: commit_message(message)?,
            },
            true,
        ),
        GitCommand::Push => (GitAction::Push, true),
        GitCommand::Pull => (GitAction::Pull, true),
        GitCommand::Checkout { branch, create } => (GitAction::Switch { branch, create }, false),
    };

    let mut repo = Monorepo::load()?;
    let git = DefaultGitOperations;
    let orchestrator = Orchestrator::new(&git, cli.jobs);

    println!(
        "{} {}",
        emoji(&out, "🚀", "[RUN]"),
        out.heading(&format!(
            "Running git {} across '{}'...",
            action.verb(),
            repo.config.name
        ))
    );

    let report = if validate {
        consistency::with_validation(&mut repo, &git, |repo| orchestrator.run(repo, &action))?
    } else {
        orchestrator.run(&mut repo, &action)?
    };

    print_report(&out, &action, &report);
    Ok(())
}

fn commit_message(message: Option<String>) -> Result<String> {
    let message = match message {
        Some(message) => message,
        None if console::Term::stdout().is_term() => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Commit message")
            .interact_text()?,
        None => bail!("a commit message is required: pass --message <MESSAGE>"),
    };

    if message.trim().is_empty() {
        bail!("the commit message must not be empty");
    }
    Ok(message)
}

fn print_report(out: &OutputConfig, action: &GitAction, report: &FanOutReport) {
    for outcome in report.outcomes() {
        println!(
            "\n{}",
            out.heading(&format!("Running git {} in {}...", action.verb(), outcome.name))
        );

        match &outcome.status {
            RepoStatus::Success => {
                if matches!(action, GitAction::Status) {
                    println!(
                        "Branch: {}",
                        outcome.branch.as_deref().unwrap_or("(detached)")
                    );
                    println!("Path: {}", outcome.path.display());
                }
                let text = outcome.output.trim_end();
                if !text.is_empty() {
                    println!("{}", text);
                }
                println!("{} {}", emoji(out, "✓", "[OK]"), out.success("done"));
            }
            RepoStatus::NoChanges => {
                println!("{} no changes", emoji(out, "·", "[SKIP]"));
            }
            RepoStatus::Skipped(reason) => {
                println!(
                    "{} {}",
                    emoji(out, "⏭️", "[SKIP]"),
                    out.warning(&format!("skipped: {}", reason))
                );
            }
            RepoStatus::Error(message) => {
                println!(
                    "{} {}",
                    emoji(out, "❌", "[ERR]"),
                    out.failure(&format!("failed: {}", message))
                );
            }
        }
    }

    let counts = report.counts();
    let summary = format!(
        "Completed git {}: {} succeeded, {} skipped, {} without changes, {} failed.",
        action.verb(),
        counts.success,
        counts.skipped,
        counts.no_changes,
        counts.errors
    );
    if counts.errors == 0 {
        println!("\n{} {}", emoji(out, "✅", "[OK]"), out.success(&summary));
    } else {
        println!("\n{} {}", emoji(out, "⚠️", "[WARN]"), out.warning(&summary));
    }
}
