use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::{ColoredString, Colorize};
use std::path::Path;

use skillsync::config::CompareMode;
use skillsync::{SyncAction, SyncOptions};

use super::{CollectionRun, ProjectArgs, Totals, sync_collections, synchronizer_for};

/// Comparison strategy flag
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareArg {
    Bytes,
    Sha256,
}

impl From<CompareArg> for CompareMode {
    fn from(arg: CompareArg) -> Self {
        match arg {
            CompareArg::Bytes => CompareMode::Bytes,
            CompareArg::Sha256 => CompareMode::Sha256,
        }
    }
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Remove installed units that no longer exist in the source
    #[arg(long)]
    pub prune: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Content comparison strategy (overrides the config)
    #[arg(long, value_enum)]
    pub compare: Option<CompareArg>,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let project = args.project.load_project(cwd)?;
    let config_dir = args.project.config_dir()?;

    let compare = args
        .compare
        .map(CompareMode::from)
        .unwrap_or(project.config.sync.compare);
    let options = SyncOptions {
        remove_orphans: args.prune || project.config.sync.remove_orphans,
        dry_run: args.dry_run,
    };

    if !args.json {
        match &project.config_path {
            Some(path) => println!("Using config: {}", path.display().to_string().dimmed()),
            None => println!("{}", "Using built-in collection layout".dimmed()),
        }
        if options.dry_run {
            println!("{}", "Running in dry-run mode".cyan());
        }
    }

    let runs = sync_collections(
        &project,
        &config_dir,
        args.project.only.as_deref(),
        &synchronizer_for(compare),
        &options,
    )?;
    let totals = Totals::from_runs(&runs);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json_output(&runs, &totals, options.dry_run))?
        );
        return Ok(());
    }

    print_runs(&runs);

    if options.dry_run {
        println!(
            "\n{} {} unit(s) would change",
            "Dry run:".cyan().bold(),
            totals.changed()
        );
    } else {
        println!("\n{}", "✨ Sync complete!".green().bold());
        println!("  {} unit(s) changed", totals.changed());
    }
    print_totals(&totals);

    Ok(())
}

pub(crate) fn json_output(
    runs: &[CollectionRun],
    totals: &Totals,
    dry_run: bool,
) -> serde_json::Value {
    serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "dry_run": dry_run,
        "changed": totals.changed(),
        "totals": totals,
        "collections": runs,
    })
}

pub(crate) fn action_symbol(action: SyncAction) -> &'static str {
    match action {
        SyncAction::New => "+",
        SyncAction::Updated => "~",
        SyncAction::Unchanged => "=",
        SyncAction::Removed => "-",
    }
}

fn colored_tag(action: SyncAction) -> ColoredString {
    let tag = format!("{:<9}", action.tag());
    match action {
        SyncAction::New => tag.green(),
        SyncAction::Updated => tag.yellow(),
        SyncAction::Unchanged => tag.dimmed(),
        SyncAction::Removed => tag.red(),
    }
}

/// One line per unit, grouped by collection
pub(crate) fn print_runs(runs: &[CollectionRun]) {
    for run in runs {
        println!(
            "\n{} {} {}",
            run.name.bold(),
            "→".dimmed(),
            run.destination.display().to_string().dimmed()
        );

        match run.report() {
            None => println!(
                "  {} Source directory does not exist: {}",
                "!".yellow(),
                run.source.display()
            ),
            Some(report) if report.entries.is_empty() => {
                println!("  {}", "(no units)".dimmed())
            }
            Some(report) => {
                for entry in &report.entries {
                    println!(
                        "  {} {} {}",
                        action_symbol(entry.action),
                        colored_tag(entry.action),
                        entry.name
                    );
                }
            }
        }
    }
}

pub(crate) fn print_totals(totals: &Totals) {
    println!(
        "  New: {}, Updated: {}, Unchanged: {}, Removed: {}",
        totals.new.to_string().green(),
        totals.updated.to_string().yellow(),
        totals.unchanged.to_string().dimmed(),
        if totals.removed > 0 {
            totals.removed.to_string().red()
        } else {
            totals.removed.to_string().dimmed()
        }
    );
    if totals.skipped_collections > 0 {
        println!(
            "  Skipped collections: {}",
            totals.skipped_collections.to_string().yellow()
        );
    }
}
