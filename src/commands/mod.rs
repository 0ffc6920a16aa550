//! CLI subcommands and the project resolution they share.

pub mod apply;
pub mod hook;
pub mod list;
pub mod status;


use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use skillsync::config::{CONFIG_DIR_ENV, CompareMode, Config, resolve_config_dir};
use skillsync::{
    HashComparator, SyncError, SyncOptions, SyncReport, Synchronizer,
};

/// Where to install from and to
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Assistant configuration directory (default: ~/.claude)
    #[arg(long, env = CONFIG_DIR_ENV)]
    pub config_dir: Option<PathBuf>,

    /// Restrict to specific collections (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Option<Vec<String>>,
}

/// A loaded configuration with the paths it resolves against
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ProjectArgs {
    pub fn load_project(&self, cwd: &Path) -> Result<Project> {
        let start_dir = self.path.clone().unwrap_or_else(|| cwd.to_path_buf());

        let config_path = match &self.config {
            Some(p) => Some(p.clone()),
            None => Config::find_config(&start_dir),
        };

        let project = match config_path {
            Some(path) => {
                tracing::debug!(config = %path.display(), "using config file");
                Project {
                    root: Config::project_root(&path),
                    config: Config::load(&path)?,
                    config_path: Some(path),
                }
            }
            None => {
                tracing::debug!(root = %start_dir.display(), "no config file, using defaults");
                Project {
                    root: start_dir,
                    config: Config::default(),
                    config_path: None,
                }
            }
        };

        if let Some(only) = &self.only {
            for name in only {
                if !project
                    .config
                    .collections
                    .keys()
                    .any(|k| k.eq_ignore_ascii_case(name))
                {
                    bail!("Unknown collection: {}", name);
                }
            }
        }

        Ok(project)
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        resolve_config_dir(self.config_dir.clone())
    }
}

/// What happened to one collection
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CollectionOutcome {
    Synced(SyncReport),
    /// Source directory absent: nothing to install
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct CollectionRun {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(flatten)]
    pub outcome: CollectionOutcome,
}

impl CollectionRun {
    pub fn report(&self) -> Option<&SyncReport> {
        match &self.outcome {
            CollectionOutcome::Synced(report) => Some(report),
            CollectionOutcome::Skipped => None,
        }
    }
}

pub fn synchronizer_for(mode: CompareMode) -> Synchronizer {
    match mode {
        CompareMode::Bytes => Synchronizer::new(),
        CompareMode::Sha256 => Synchronizer::with_comparator(HashComparator),
    }
}

/// Sync every selected collection, stopping at the first error.
pub fn sync_collections(
    project: &Project,
    config_dir: &Path,
    only: Option<&[String]>,
    synchronizer: &Synchronizer,
    options: &SyncOptions,
) -> Result<Vec<CollectionRun>> {
    let mut runs = Vec::new();

    for (name, collection) in project.config.selected_collections(only) {
        let source = collection.source_path(&project.root);
        let destination = collection.destination_path(config_dir);
        let kind = collection.unit_kind();

        let outcome = match synchronizer.sync(&source, &destination, &kind, options) {
            Ok(report) => CollectionOutcome::Synced(report),
            Err(SyncError::NotFound(path)) => {
                tracing::warn!(
                    collection = %name,
                    source = %path.display(),
                    "source directory missing, skipping"
                );
                CollectionOutcome::Skipped
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to sync collection '{}'", name));
            }
        };

        runs.push(CollectionRun {
            name: name.clone(),
            source,
            destination,
            outcome,
        });
    }

    Ok(runs)
}

/// Totals across all collections
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub skipped_collections: usize,
}

impl Totals {
    pub fn from_runs(runs: &[CollectionRun]) -> Self {
        use skillsync::SyncAction;

        let mut totals = Totals::default();
        for run in runs {
            match run.report() {
                Some(report) => {
                    totals.new += report.count(SyncAction::New);
                    totals.updated += report.count(SyncAction::Updated);
                    totals.unchanged += report.count(SyncAction::Unchanged);
                    totals.removed += report.count(SyncAction::Removed);
                }
                None => totals.skipped_collections += 1,
            }
        }
        totals
    }

    pub fn changed(&self) -> usize {
        self.new + self.updated + self.removed
    }
}
