use anyhow::Result;
use clap::Args;
use std::path::Path;

use skillsync::SyncOptions;

use super::apply::{json_output, print_runs, print_totals};
use super::{ProjectArgs, Totals, sync_collections, synchronizer_for};

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Also report installed units missing from the source
    #[arg(long)]
    pub prune: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Dry-run every collection; exits 1 when anything is out of date.
pub fn run_status(args: StatusArgs, cwd: &Path) -> Result<()> {
    let project = args.project.load_project(cwd)?;
    let config_dir = args.project.config_dir()?;

    let options = SyncOptions {
        remove_orphans: args.prune || project.config.sync.remove_orphans,
        dry_run: true,
    };

    let runs = sync_collections(
        &project,
        &config_dir,
        args.project.only.as_deref(),
        &synchronizer_for(project.config.sync.compare),
        &options,
    )?;
    let totals = Totals::from_runs(&runs);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json_output(&runs, &totals, true))?
        );
    } else {
        print_runs(&runs);
        println!();
        print_totals(&totals);
    }

    if totals.changed() > 0 {
        if !args.json {
            println!("\nStatus: {} unit(s) out of date", totals.changed());
        }
        std::process::exit(1);
    }

    if !args.json {
        println!("\nStatus: All good");
    }

    Ok(())
}
