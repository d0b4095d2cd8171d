//! # Init Command Implementation
//!
//! Creates `.monorepo.json`, the `.monorepo-links/` directory and the
//! lockfile in the target directory, and sets up the meta repository that
//! versions the configuration document. With `--interactive` the name and
//! description are prompted for.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::PathBuf;

use virtual_monorepo::init::{self, MetaRepository};
use virtual_monorepo::output::{emoji, OutputConfig};
use virtual_monorepo::path;
use virtual_monorepo::repository::DefaultGitOperations;

/// Initialize a new virtual monorepo
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (created if missing)
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Name of the monorepo (defaults to the directory name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Optional description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Prompt for name and description
    #[arg(short, long)]
    pub interactive: bool,
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let (name, description) = if args.interactive {
        prompt_details(&args)?
    } else {
        (args.name.clone(), args.description.clone())
    };

    let (_, report) = init::init(
        &args.path,
        name.as_deref(),
        description.as_deref(),
        &DefaultGitOperations,
    )?;

    println!(
        "{} {}",
        emoji(&out, "✅", "[OK]"),
        out.success(&format!("Initialized virtual monorepo at {}", report.root.display()))
    );
    println!("   config:   {}", report.config_path.display());
    println!("   links:    {}", report.links_dir.display());
    println!("   lockfile: {}", report.lockfile.display());

    match &report.meta {
        MetaRepository::Created => println!(
            "{} Initialized meta Git repository",
            emoji(&out, "✅", "[OK]")
        ),
        MetaRepository::AlreadyPresent => {
            println!("   Using the existing Git repository as meta repository")
        }
        MetaRepository::Failed(reason) => println!(
            "{} {}",
            emoji(&out, "⚠️", "[WARN]"),
            out.warning(&format!("Failed to initialize meta Git repository: {}", reason))
        ),
    }

    println!(
        "{} Run `mono add --path <dir>` to register modules",
        emoji(&out, "💡", "[TIP]")
    );
    Ok(())
}

fn prompt_details(args: &InitArgs) -> Result<(Option<String>, Option<String>)> {
    let theme = ColorfulTheme::default();
    let default = args
        .name
        .clone()
        .unwrap_or_else(|| init::default_name(&path::resolve(&args.path).unwrap_or_default()));

    let name: String = Input::with_theme(&theme)
        .with_prompt("Monorepo name")
        .default(default)
        .interact_text()?;

    let description: String = Input::with_theme(&theme)
        .with_prompt("Description (optional)")
        .with_initial_text(args.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let description = description.trim();
    Ok((
        Some(name.trim().to_string()),
        (!description.is_empty()).then(|| description.to_string()),
    ))
}
