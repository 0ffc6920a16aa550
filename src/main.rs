//! SkillSync CLI
//!
//! Command-line interface for installing skills and agents.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use is_terminal::IsTerminal;
use std::env;
use std::path::PathBuf;

use commands::apply::ApplyArgs;
use commands::hook::HookCommand;
use commands::list::ListArgs;
use commands::status::StatusArgs;

#[derive(Parser)]
#[command(name = "skillsync")]
#[command(
    author,
    version,
    about = "Install AI assistant skills and agents from a repository"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a skillsync.toml and the default source directories
    Init {
        /// Project root directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Install skills and agents into the assistant's config directory
    Apply(ApplyArgs),

    /// Report what `apply` would change; exits 1 when out of date
    Status(StatusArgs),

    /// List the units each collection provides
    List(ListArgs),

    /// Manage the git hooks that re-run `apply` after a pull
    Hook {
        #[command(subcommand)]
        command: HookCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cwd = env::current_dir().context("Could not determine the current directory")?;

    match cli.command {
        Commands::Init { path, force } => {
            let project_root = path.unwrap_or(cwd);

            println!("{}", "Initializing skillsync configuration...\n".cyan());
            skillsync::init::init(&project_root, force)?;

            println!("\n{}", "✨ Initialization complete!".green().bold());
            println!(
                "\nNext steps:\n  1. Add skills under {} and agents under {}\n  \
                 2. Run {} to install them",
                "skills/".cyan(),
                "agents/".cyan(),
                "skillsync apply".cyan()
            );
        }
        Commands::Apply(args) => commands::apply::run_apply(args, &cwd)?,
        Commands::Status(args) => commands::status::run_status(args, &cwd)?,
        Commands::List(args) => commands::list::run_list(args, &cwd)?,
        Commands::Hook { command } => commands::hook::run_hook(command, &cwd)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
