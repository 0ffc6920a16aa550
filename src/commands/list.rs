use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use skillsync::SyncError;
use skillsync::catalog::catalog;

use super::ProjectArgs;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

pub fn run_list(args: ListArgs, cwd: &Path) -> Result<()> {
    let project = args.project.load_project(cwd)?;
    let mut problems = 0usize;

    for (name, collection) in project
        .config
        .selected_collections(args.project.only.as_deref())
    {
        let source = collection.source_path(&project.root);
        println!(
            "\n{} {}",
            name.bold(),
            format!("({})", collection.unit_kind().label()).dimmed()
        );

        let entries = match catalog(&source, &collection.unit_kind()) {
            Ok(entries) => entries,
            Err(SyncError::NotFound(path)) => {
                println!(
                    "  {} Source directory does not exist: {}",
                    "!".yellow(),
                    path.display()
                );
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if entries.is_empty() {
            println!("  {}", "(no units)".dimmed());
        }

        for entry in entries {
            let description = entry.description.as_deref().unwrap_or("");
            println!("  {} {}", entry.name.cyan(), description.dimmed());
            if let Some(problem) = entry.problem {
                println!("    {} {}", "⚠".yellow(), problem);
                problems += 1;
            }
        }
    }

    if problems > 0 {
        println!("\n{} unit(s) with frontmatter problems", problems);
    }

    Ok(())
}
