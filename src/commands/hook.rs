use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use skillsync::hooks::{self, HookOutcome};

#[derive(Subcommand, Debug)]
pub enum HookCommand {
    /// Re-run `skillsync apply` after git updates the checkout
    Install(HookArgs),
    /// Remove the skillsync block from the git hooks
    Uninstall(HookArgs),
    /// Show which git hooks carry the skillsync block
    Status(HookArgs),
}

#[derive(Args, Debug)]
pub struct HookArgs {
    /// Repository root (default: current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Git hooks to manage (comma-separated)
    #[arg(long, alias = "event", value_delimiter = ',', default_value = "post-merge")]
    pub events: Vec<String>,
}

impl HookArgs {
    fn repo_root(&self, cwd: &Path) -> PathBuf {
        let root = self.path.clone().unwrap_or_else(|| cwd.to_path_buf());
        std::fs::canonicalize(&root).unwrap_or(root)
    }
}

pub fn run_hook(cmd: HookCommand, cwd: &Path) -> Result<()> {
    match cmd {
        HookCommand::Install(args) => {
            let repo_root = args.repo_root(cwd);
            let exe = std::env::current_exe().context("Could not locate the skillsync binary")?;
            let command = hooks::hook_command(&exe, &repo_root);

            for event in &args.events {
                let outcome = hooks::install_hook(&repo_root, event, &command)?;
                let verb = match outcome {
                    HookOutcome::Installed => "Installed",
                    HookOutcome::Updated => "Updated",
                    _ => "Already installed",
                };
                println!("  {} {} hook: {}", "✔".green(), verb, event);
            }
        }
        HookCommand::Uninstall(args) => {
            let repo_root = args.repo_root(cwd);
            for event in &args.events {
                match hooks::uninstall_hook(&repo_root, event)? {
                    HookOutcome::Removed => {
                        println!("  {} Removed hook: {}", "✔".green(), event)
                    }
                    _ => println!("  {} Not installed: {}", "○".yellow(), event),
                }
            }
        }
        HookCommand::Status(args) => {
            let repo_root = args.repo_root(cwd);
            for event in &args.events {
                if hooks::hook_installed(&repo_root, event)? {
                    println!("  {} {}", "✔".green(), event);
                } else {
                    println!("  {} {} (not installed)", "○".yellow(), event);
                }
            }
        }
    }

    Ok(())
}
